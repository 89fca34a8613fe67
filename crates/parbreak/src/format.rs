#![forbid(unsafe_code)]

//! Turn a break path into laid-out lines.
//!
//! The formatter re-derives every ratio from the prefix sums instead of
//! reusing search state, so the same items and path always format the same
//! way no matter how the path was found.

use crate::config::JustifyConfig;
use crate::item::Item;
use crate::prefix::PrefixSums;
use crate::search::fit_line;

/// One output line, ready to be walked left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<P> {
    /// Boxes and glue of the line. The breaking item and untaken penalties
    /// are omitted.
    pub items: Vec<Item<P>>,
    /// Adjustment ratio for every glue of the line. Always finite.
    pub ratio: f64,
    /// Width the line was fitted to.
    pub target_width: f64,
    /// Width added by the break itself (a hyphen), else 0.
    pub break_width: f64,
    /// The line ends at a flagged penalty and should show a hyphen.
    pub hyphenated: bool,
    /// Trailing space a ragged line leaves empty.
    pub fill: f64,
}

impl<P> Line<P> {
    /// Width of the line with glue set at `self.ratio`, including any
    /// hyphen. Excludes `fill`.
    #[must_use]
    pub fn rendered_width(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.adjusted_width(self.ratio))
            .sum::<f64>()
            + self.break_width
    }

    /// Natural width (ratio 0), including any hyphen.
    #[must_use]
    pub fn natural_width(&self) -> f64 {
        self.items.iter().map(Item::width).sum::<f64>() + self.break_width
    }

    /// Payloads of the line's boxes, in order.
    pub fn payloads(&self) -> impl Iterator<Item = &P> {
        self.items.iter().filter_map(Item::payload)
    }

    /// Left edge of every box when the line is set at `self.ratio`.
    #[must_use]
    pub fn box_positions(&self) -> Vec<(f64, &P)> {
        let mut x = 0.0;
        let mut placed = Vec::new();
        for item in &self.items {
            if let Item::Box { payload, .. } = item {
                placed.push((x, payload));
            }
            x += item.adjusted_width(self.ratio);
        }
        placed
    }

    /// Whether the rendered line is wider than its target.
    #[must_use]
    pub fn overflows(&self) -> bool {
        self.rendered_width() > self.target_width + crate::search::FIT_EPSILON
    }
}

/// Collect the boxes and glue of `start .. end`, dropping penalties.
pub(crate) fn line_items<P: Clone>(items: &[Item<P>], start: usize, end: usize) -> Vec<Item<P>> {
    items[start..end]
        .iter()
        .filter(|item| !item.is_penalty())
        .cloned()
        .collect()
}

/// Lay out one line per break in `breaks`.
///
/// Line `k` spans from just after break `k - 1` (or the paragraph start) to
/// break `k`. Infinite ratios (a lone box that cannot stretch) are stored as
/// 0, leaving the line at its natural width.
#[must_use]
pub fn format_lines<P: Clone>(
    items: &[Item<P>],
    breaks: &[usize],
    sums: &PrefixSums,
    config: &JustifyConfig,
) -> Vec<Line<P>> {
    let mut start = 0;
    let mut lines = Vec::with_capacity(breaks.len());
    for (line, &end) in breaks.iter().enumerate() {
        let target = config.target_width(line);
        let fit = fit_line(items, sums, start, end, target, config.last_line);
        let break_item = &items[end];
        let ratio = if fit.ratio.is_finite() { fit.ratio } else { 0.0 };
        let mut laid = Line {
            items: line_items(items, start, end),
            ratio,
            target_width: target,
            break_width: if break_item.is_penalty() {
                break_item.width()
            } else {
                0.0
            },
            hyphenated: break_item.is_flagged(),
            fill: 0.0,
        };
        laid.fill = (target - laid.rendered_width()).max(0.0);
        lines.push(laid);
        start = end + 1;
    }
    lines
}
