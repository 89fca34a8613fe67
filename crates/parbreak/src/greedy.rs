#![forbid(unsafe_code)]

//! Degraded-mode first-fit wrapping.
//!
//! Used only when the optimal search finds no feasible layout. Words are
//! packed while they fit; a word wider than the whole column goes on a line
//! by itself and overflows. Lines ended by a forced break (the paragraph's
//! last line in particular) are left-aligned. Other lines stretch toward the
//! target, but never beyond the configured tolerance, so the result is
//! ragged where the spacing would otherwise get ugly.

use crate::config::JustifyConfig;
use crate::format::{Line, line_items};
use crate::item::Item;
use crate::prefix::PrefixSums;
use crate::search::adjustment_ratio;

struct OpenLine {
    start: usize,
    /// Exclusive end of the content placed so far.
    end: usize,
    width: f64,
}

/// Wrap `items` first-fit against `config`'s target widths.
///
/// Boxes joined by untaken discretionary penalties are kept together as one
/// word. Returns at least one line whenever `items` holds a box.
#[must_use]
pub fn wrap_greedy<P: Clone>(items: &[Item<P>], config: &JustifyConfig) -> Vec<Line<P>> {
    let sums = PrefixSums::new(items);
    let mut lines: Vec<Line<P>> = Vec::new();
    let mut open: Option<OpenLine> = None;
    let mut index = 0;

    while index < items.len() {
        match &items[index] {
            Item::Glue { .. } => {
                index += 1;
            }
            item if item.is_forced_break() => {
                if let Some(line) = open.take() {
                    lines.push(close_line(items, &sums, config, &line, lines.len(), true));
                }
                index += 1;
            }
            _ => {
                let chunk_end = word_end(items, index);
                let chunk_width = sums.span(index, chunk_end).width;
                open = Some(match open.take() {
                    None => OpenLine {
                        start: index,
                        end: chunk_end,
                        width: chunk_width,
                    },
                    Some(line) => {
                        let gap = sums.span(line.end, index).width;
                        let target = config.target_width(lines.len());
                        if line.width + gap + chunk_width <= target {
                            OpenLine {
                                start: line.start,
                                end: chunk_end,
                                width: line.width + gap + chunk_width,
                            }
                        } else {
                            lines.push(close_line(items, &sums, config, &line, lines.len(), false));
                            OpenLine {
                                start: index,
                                end: chunk_end,
                                width: chunk_width,
                            }
                        }
                    }
                });
                index = chunk_end;
            }
        }
    }

    if let Some(line) = open.take() {
        lines.push(close_line(items, &sums, config, &line, lines.len(), true));
    }

    tracing::debug!(lines = lines.len(), "greedy wrap complete");
    lines
}

/// End of the word starting at `start`: boxes and non-forced penalties
/// (discretionary breaks greedy mode never takes).
fn word_end<P>(items: &[Item<P>], start: usize) -> usize {
    let mut end = start;
    while let Some(item) = items.get(end) {
        if item.is_box() || (item.is_penalty() && !item.is_forced_break()) {
            end += 1;
        } else {
            break;
        }
    }
    end
}

fn close_line<P: Clone>(
    items: &[Item<P>],
    sums: &PrefixSums,
    config: &JustifyConfig,
    open: &OpenLine,
    line: usize,
    ragged: bool,
) -> Line<P> {
    let target = config.target_width(line);
    let ratio = if ragged {
        0.0
    } else {
        let span = sums.span(open.start, open.end);
        let ratio = adjustment_ratio(target, span.width, span.stretch, span.shrink);
        if ratio.is_finite() {
            ratio.clamp(0.0, config.tolerance)
        } else {
            0.0
        }
    };
    let mut laid = Line {
        items: line_items(items, open.start, open.end),
        ratio,
        target_width: target,
        break_width: 0.0,
        hyphenated: false,
        fill: 0.0,
    };
    laid.fill = (target - laid.rendered_width()).max(0.0);
    laid
}
