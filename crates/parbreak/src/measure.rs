#![forbid(unsafe_code)]

//! Width measurement collaborators.
//!
//! The engine never interprets glyphs. Everything it knows about text width
//! comes from a [`Measure`] implementation supplied by the caller. Two
//! adapters are provided:
//!
//! - [`CellMeasure`]: terminal cell widths (CJK = 2, emoji sequences = 2).
//! - [`CachedMeasure`]: memoizes any measurer behind an LRU cache.
//!
//! Any `Fn(&str, f64) -> f64` is a measurer as well.

use std::fmt;
use std::hash::BuildHasherDefault;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use rustc_hash::FxHasher;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Maps text at a font size to an abstract width.
///
/// Implementations must be pure: the same text and size always yield the
/// same width.
pub trait Measure {
    /// Width of `text` set at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> f64;

    /// Natural width of one inter-word space.
    fn space_width(&self, font_size: f64) -> f64 {
        self.measure(" ", font_size)
    }
}

impl<F> Measure for F
where
    F: Fn(&str, f64) -> f64,
{
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        self(text, font_size)
    }
}

// =========================================================================
// CellMeasure
// =========================================================================

/// Terminal cell measurement. Font size is ignored: one cell is one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellMeasure;

impl CellMeasure {
    /// Display width of a single grapheme cluster in cells.
    #[must_use]
    pub fn grapheme_width(grapheme: &str) -> usize {
        if grapheme.is_ascii() {
            return grapheme.len();
        }
        // Emoji presentation and ZWJ sequences occupy two cells.
        if grapheme.contains('\u{FE0F}') || grapheme.contains('\u{200D}') {
            return 2;
        }
        UnicodeWidthStr::width(grapheme).min(2)
    }

    /// Display width of `text` in cells.
    #[must_use]
    pub fn cells(text: &str) -> usize {
        if text.is_ascii() {
            return text.len();
        }
        text.graphemes(true).map(Self::grapheme_width).sum()
    }
}

impl Measure for CellMeasure {
    fn measure(&self, text: &str, _font_size: f64) -> f64 {
        Self::cells(text) as f64
    }
}

// =========================================================================
// CachedMeasure
// =========================================================================

type FxBuild = BuildHasherDefault<FxHasher>;

/// Hit/miss counters for a [`CachedMeasure`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasureCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl MeasureCacheStats {
    /// Fraction of lookups served from cache.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cached entries: widths of measured text, and the inner measurer's own
/// space width, both per font size bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Text(String, u64),
    Space(u64),
}

struct CacheState {
    cache: LruCache<CacheKey, f64, FxBuild>,
    hits: u64,
    misses: u64,
}

/// LRU-memoized measurer.
///
/// Keys are `(text, font_size)`; the font size participates by bit pattern.
/// Space widths come from the inner measurer's [`Measure::space_width`] and
/// are cached separately, so wrapping never changes the spacing.
/// Prose repeats short words constantly, so even a small cache absorbs most
/// measurement calls. The cache sits behind a `Mutex`, which keeps the
/// adapter `Sync` for concurrent paragraphs.
pub struct CachedMeasure<M> {
    inner: M,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl<M: Measure> CachedMeasure<M> {
    /// Wrap `inner` with a cache holding up to `capacity` widths (minimum 1).
    #[must_use]
    pub fn new(inner: M, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            capacity: cap.get(),
            state: Mutex::new(CacheState {
                cache: LruCache::with_hasher(cap, FxBuild::default()),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// The wrapped measurer.
    #[must_use]
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Drop every cached width, e.g. after a font change.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.cache.clear();
        state.hits = 0;
        state.misses = 0;
    }

    #[must_use]
    pub fn stats(&self) -> MeasureCacheStats {
        let state = self.lock();
        MeasureCacheStats {
            hits: state.hits,
            misses: state.misses,
            size: state.cache.len(),
            capacity: self.capacity,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        // A poisoned cache still holds valid widths.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<M: Measure> Measure for CachedMeasure<M> {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        let key = CacheKey::Text(text.to_owned(), font_size.to_bits());
        self.lookup(key, || self.inner.measure(text, font_size))
    }

    fn space_width(&self, font_size: f64) -> f64 {
        let key = CacheKey::Space(font_size.to_bits());
        self.lookup(key, || self.inner.space_width(font_size))
    }
}

impl<M: Measure> CachedMeasure<M> {
    fn lookup(&self, key: CacheKey, compute: impl FnOnce() -> f64) -> f64 {
        {
            let mut state = self.lock();
            if let Some(&width) = state.cache.get(&key) {
                state.hits += 1;
                return width;
            }
            state.misses += 1;
        }
        // Measure outside the lock so a slow measurer does not serialize callers.
        let width = compute();
        self.lock().cache.put(key, width);
        width
    }
}

impl<M: fmt::Debug> fmt::Debug for CachedMeasure<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMeasure")
            .field("inner", &self.inner)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn closure_is_a_measurer() {
        let m = |text: &str, size: f64| text.len() as f64 * size * 0.5;
        assert_eq!(m.measure("abcd", 10.0), 20.0);
        assert_eq!(m.space_width(10.0), 5.0);
    }

    #[test]
    fn cell_measure_ascii() {
        assert_eq!(CellMeasure.measure("hello", 12.0), 5.0);
        assert_eq!(CellMeasure.space_width(12.0), 1.0);
    }

    #[test]
    fn cell_measure_wide_chars() {
        assert_eq!(CellMeasure::cells("全角"), 4);
        assert_eq!(CellMeasure::cells("a全"), 3);
    }

    #[test]
    fn cell_measure_combining_marks() {
        // "e" + combining acute is one cell.
        assert_eq!(CellMeasure::cells("e\u{0301}"), 1);
    }

    #[test]
    fn cell_measure_emoji_sequence() {
        assert_eq!(CellMeasure::cells("👨\u{200D}👩\u{200D}👧"), 2);
    }

    #[test]
    fn cache_hits_after_first_lookup() {
        let calls = Cell::new(0u32);
        let counting = |text: &str, _: f64| {
            calls.set(calls.get() + 1);
            text.len() as f64
        };
        let cached = CachedMeasure::new(counting, 8);
        assert_eq!(cached.measure("word", 1.0), 4.0);
        assert_eq!(cached.measure("word", 1.0), 4.0);
        assert_eq!(calls.get(), 1);
        let stats = cached.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cache_keys_on_font_size() {
        let cached = CachedMeasure::new(|t: &str, s: f64| t.len() as f64 * s, 8);
        assert_eq!(cached.measure("ab", 1.0), 2.0);
        assert_eq!(cached.measure("ab", 2.0), 4.0);
        assert_eq!(cached.stats().misses, 2);
    }

    #[test]
    fn cache_evicts_least_recent() {
        let cached = CachedMeasure::new(CellMeasure, 2);
        cached.measure("a", 1.0);
        cached.measure("b", 1.0);
        cached.measure("c", 1.0);
        assert_eq!(cached.stats().size, 2);
        cached.measure("a", 1.0);
        assert_eq!(cached.stats().misses, 4);
    }

    struct WideSpaces;

    impl Measure for WideSpaces {
        fn measure(&self, _text: &str, _font_size: f64) -> f64 {
            1.0
        }

        fn space_width(&self, _font_size: f64) -> f64 {
            7.0
        }
    }

    #[test]
    fn cache_keeps_inner_space_width() {
        let cached = CachedMeasure::new(WideSpaces, 8);
        assert_eq!(cached.space_width(1.0), 7.0);
        assert_eq!(cached.space_width(1.0), 7.0);
        // A measured " " is still text, distinct from the space width.
        assert_eq!(cached.measure(" ", 1.0), 1.0);
        let stats = cached.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.size, 2);
    }

    #[test]
    fn invalidate_clears() {
        let cached = CachedMeasure::new(CellMeasure, 0);
        assert_eq!(cached.stats().capacity, 1);
        cached.measure("x", 1.0);
        cached.invalidate();
        assert_eq!(cached.stats(), MeasureCacheStats {
            hits: 0,
            misses: 0,
            size: 0,
            capacity: 1,
        });
    }
}
