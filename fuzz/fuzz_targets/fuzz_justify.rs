#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parbreak::{CellMeasure, JustifyConfig, LastLine, justify_words, render_monospace};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    width: u8,
    second_width: Option<u8>,
    tolerance: u8,
    max_active: u8,
    justify_last: bool,
    text: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    // Cap length to keep fuzzing fast.
    if input.text.len() > 2048 {
        return;
    }
    let words: Vec<&str> = input.text.split_whitespace().collect();

    let width = f64::from(input.width.max(1));
    let mut config = JustifyConfig::terminal(width)
        .with_tolerance(f64::from(input.tolerance % 16) / 2.0)
        .with_max_active_nodes(usize::from(input.max_active.max(1)));
    if let Some(second) = input.second_width {
        config = config.with_widths([width, f64::from(second.max(1))]);
    }
    if input.justify_last {
        config = config.with_last_line(LastLine::Justify);
    }

    let Ok(layout) = justify_words(&words, &CellMeasure, 1.0, &config) else {
        // Only blank input can be rejected: the settings above are valid.
        assert!(words.iter().all(|word| word.chars().all(|c| c == '\u{ad}')));
        return;
    };

    assert!(!layout.lines().is_empty());
    for line in layout.lines() {
        assert!(line.ratio.is_finite());
        assert!(line.fill >= 0.0);
        // Only a lone word may overflow, and only after degrading.
        if line.overflows() {
            assert!(layout.is_fallback(), "optimal line overflows: {line:?}");
            assert!(
                line.items.iter().all(|item| !item.is_glue()),
                "overflowing line holds several words: {line:?}"
            );
        }
    }

    let rows = render_monospace(layout.lines());
    assert_eq!(rows.len(), layout.lines().len());
});
