//! Property-based invariant tests for the justification pipeline.
//!
//! These tests verify structural invariants that must hold for arbitrary
//! paragraphs and measures:
//!
//! 1. Optimal lines fill their target width exactly (ragged last lines up
//!    to their fill).
//! 2. Repeated runs produce identical break paths.
//! 3. Every optimal path ends at the terminal forced break.
//! 4. The degraded wrapper always returns lines, and only a lone word may
//!    overflow.
//! 5. Formatting a path twice yields identical lines.
//! 6. No word is lost, duplicated or reordered.
//! 7. Cached measurement agrees with the measurer it wraps, space width
//!    included, so a cached layout is identical to an uncached one.

use parbreak::{
    CachedMeasure, CellMeasure, JustifyConfig, Layout, Measure, PrefixSums, build_items,
    format_lines, justify, justify_words, render_monospace, search,
};

use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn arb_words(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,9}", 1..max)
}

fn arb_width() -> impl Strategy<Value = f64> {
    (10u32..60).prop_map(f64::from)
}

fn as_strs(words: &[String]) -> Vec<&str> {
    words.iter().map(String::as_str).collect()
}

fn within(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0)
}

// ── 1. Exact fill ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn optimal_lines_fill_target(words in arb_words(40), width in arb_width()) {
        let words = as_strs(&words);
        let config = JustifyConfig::new(width);
        let layout = justify_words(&words, &CellMeasure, 1.0, &config).unwrap();
        if let Layout::Optimal { lines, .. } = &layout {
            for line in lines {
                prop_assert!(line.ratio >= -1.0 && line.ratio <= config.tolerance);
                prop_assert!(
                    within(line.rendered_width() + line.fill, line.target_width),
                    "rendered {} + fill {} vs target {}",
                    line.rendered_width(),
                    line.fill,
                    line.target_width
                );
            }
        }
    }
}

// ── 2. Determinism ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn break_paths_are_deterministic(words in arb_words(30), width in arb_width()) {
        let words = as_strs(&words);
        let config = JustifyConfig::new(width);
        let first = justify_words(&words, &CellMeasure, 1.0, &config).unwrap();
        let second = justify_words(&words, &CellMeasure, 1.0, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ── 3. Forced-break termination ─────────────────────────────────────────

proptest! {
    #[test]
    fn paths_end_at_terminal_break(words in arb_words(30), width in arb_width()) {
        let words = as_strs(&words);
        let config = JustifyConfig::new(width).with_tolerance(10.0);
        let items = build_items(&words, &CellMeasure, 1.0, &config).unwrap();
        let sums = PrefixSums::new(&items);
        if let Ok(path) = search(&items, &sums, &config) {
            prop_assert_eq!(path.breaks.last().copied(), Some(items.len() - 1));
            prop_assert!(path.breaks.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(path.line_count(), path.breaks.len());
        }
    }
}

// ── 4. Fallback safety ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn fallback_never_overflows_except_lone_words(
        words in arb_words(30),
        width in arb_width(),
    ) {
        let words = as_strs(&words);
        let config = JustifyConfig::new(width)
            .with_tolerance(0.0)
            .with_glue_factors(0.5, 0.0);
        let layout = justify_words(&words, &CellMeasure, 1.0, &config).unwrap();
        prop_assert!(!layout.lines().is_empty());
        for line in layout.lines() {
            if line.payloads().count() > 1 {
                prop_assert!(!line.overflows(), "line overflows: {:?}", line);
            }
        }
    }
}

proptest! {
    #[test]
    fn rendered_rows_fit_the_column(words in arb_words(30), width in 10u32..40) {
        let words = as_strs(&words);
        let config = JustifyConfig::terminal(f64::from(width));
        let layout = justify_words(&words, &CellMeasure, 1.0, &config).unwrap();
        for row in render_monospace(layout.lines()) {
            prop_assert!(CellMeasure::cells(&row) <= width as usize, "{:?}", row);
        }
    }
}

// ── 5. Idempotent formatting ────────────────────────────────────────────

proptest! {
    #[test]
    fn formatting_is_idempotent(words in arb_words(30), width in arb_width()) {
        let words = as_strs(&words);
        let config = JustifyConfig::new(width).with_tolerance(10.0);
        let items = build_items(&words, &CellMeasure, 1.0, &config).unwrap();
        let sums = PrefixSums::new(&items);
        if let Ok(path) = search(&items, &sums, &config) {
            let first = format_lines(&items, &path.breaks, &sums, &config);
            let second = format_lines(&items, &path.breaks, &sums, &config);
            prop_assert_eq!(first, second);
        }
    }
}

// ── 6. Content preservation ─────────────────────────────────────────────

proptest! {
    #[test]
    fn words_survive_in_order(words in arb_words(40), width in arb_width()) {
        let words = as_strs(&words);
        let config = JustifyConfig::new(width);
        let items = build_items(&words, &CellMeasure, 1.0, &config).unwrap();
        let layout = justify(&items, &config).unwrap();
        let laid: Vec<&str> = layout
            .lines()
            .iter()
            .flat_map(|line| line.payloads().copied())
            .collect();
        prop_assert_eq!(laid, words);
    }
}

// ── 7. Cached measurement ───────────────────────────────────────────────

proptest! {
    #[test]
    fn cache_agrees_with_inner(words in arb_words(20)) {
        let cached = CachedMeasure::new(CellMeasure, 8);
        for word in &words {
            prop_assert_eq!(cached.measure(word, 1.0), CellMeasure.measure(word, 1.0));
            prop_assert_eq!(cached.measure(word, 1.0), CellMeasure.measure(word, 1.0));
        }
        let stats = cached.stats();
        prop_assert_eq!(stats.hits + stats.misses, 2 * words.len() as u64);
        prop_assert!(stats.size <= 8);
    }
}

/// Proportional measurer with its own space width, unrelated to `" "`.
struct Proportional;

impl Measure for Proportional {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * 0.5
    }

    fn space_width(&self, font_size: f64) -> f64 {
        font_size * 0.3
    }
}

proptest! {
    #[test]
    fn cached_layout_matches_uncached(
        words in arb_words(25),
        width in arb_width(),
        size in (4u32..16).prop_map(f64::from),
    ) {
        let words = as_strs(&words);
        let cached = CachedMeasure::new(Proportional, 16);
        prop_assert_eq!(cached.space_width(size), Proportional.space_width(size));

        let config = JustifyConfig::new(width * 4.0);
        let plain = justify_words(&words, &Proportional, size, &config).unwrap();
        let memo = justify_words(&words, &cached, size, &config).unwrap();
        prop_assert_eq!(plain, memo);
    }
}
