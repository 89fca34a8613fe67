#![forbid(unsafe_code)]

//! Monospace rendering of laid-out lines.
//!
//! Glue widths are fractional after adjustment, but a terminal only has
//! whole cells. Each box is placed at its exact left edge rounded to the
//! nearest cell, so rounding error never accumulates along a line. Adjacent
//! words always keep at least one space between them.

use crate::format::Line;
use crate::item::Item;
use crate::measure::CellMeasure;

/// Render one line into a string of cells.
#[must_use]
pub fn render_line<P: AsRef<str>>(line: &Line<P>) -> String {
    let mut out = String::new();
    let mut x = 0.0_f64;
    let mut col = 0usize;
    let mut gap = false;

    for item in &line.items {
        match item {
            Item::Box { width, payload } => {
                let text = payload.as_ref();
                let wanted = x.round().max(0.0) as usize;
                let start = wanted.max(col + usize::from(gap));
                out.extend(std::iter::repeat_n(' ', start - col));
                out.push_str(text);
                col = start + CellMeasure::cells(text);
                x += width;
                gap = false;
            }
            glue @ Item::Glue { .. } => {
                x += glue.adjusted_width(line.ratio);
                gap = true;
            }
            Item::Penalty { .. } => {}
        }
    }
    if line.hyphenated {
        out.push('-');
    }
    out
}

/// Render every line. Lines are not padded on the right.
#[must_use]
pub fn render_monospace<P: AsRef<str>>(lines: &[Line<P>]) -> Vec<String> {
    lines.iter().map(render_line).collect()
}
