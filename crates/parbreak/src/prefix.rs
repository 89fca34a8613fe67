#![forbid(unsafe_code)]

//! Cumulative width / stretch / shrink over an item stream.
//!
//! `sums[i]` holds the totals of items `0..=i`. Penalties contribute
//! nothing: their width only appears in a line that breaks at them, which
//! the caller adds separately. Any half-open range is then one subtraction.

use std::ops::{Add, Sub};

use crate::item::Item;

/// Width, stretch and shrink of a run of items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub width: f64,
    pub stretch: f64,
    pub shrink: f64,
}

impl Add for Totals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            width: self.width + rhs.width,
            stretch: self.stretch + rhs.stretch,
            shrink: self.shrink + rhs.shrink,
        }
    }
}

impl Sub for Totals {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            width: self.width - rhs.width,
            stretch: self.stretch - rhs.stretch,
            shrink: self.shrink - rhs.shrink,
        }
    }
}

impl Totals {
    fn of<P>(item: &Item<P>) -> Self {
        match item {
            Item::Box { width, .. } => Self {
                width: *width,
                ..Self::default()
            },
            Item::Glue {
                width,
                stretch,
                shrink,
            } => Self {
                width: *width,
                stretch: *stretch,
                shrink: *shrink,
            },
            Item::Penalty { .. } => Self::default(),
        }
    }
}

/// Prefix sums over an item stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefixSums {
    sums: Vec<Totals>,
}

impl PrefixSums {
    /// Accumulate `items` in one pass.
    #[must_use]
    pub fn new<P>(items: &[Item<P>]) -> Self {
        let sums = items
            .iter()
            .scan(Totals::default(), |acc, item| {
                *acc = *acc + Totals::of(item);
                Some(*acc)
            })
            .collect();
        Self { sums }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Totals of items `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn through(&self, index: usize) -> Totals {
        self.sums[index]
    }

    /// Totals of items `0..end`; zero for `end == 0`.
    #[must_use]
    pub fn before(&self, end: usize) -> Totals {
        match end {
            0 => Totals::default(),
            n => self.sums[n - 1],
        }
    }

    /// Totals of the half-open item range `start..end`.
    ///
    /// Empty or inverted ranges yield zero.
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> Totals {
        if end <= start {
            return Totals::default();
        }
        self.before(end) - self.before(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Item<&'static str>> {
        vec![
            Item::boxed(10.0, "A"),
            Item::glue(5.0, 2.5, 1.5),
            Item::boxed(10.0, "B"),
            Item::penalty(3.0, 50.0, true),
            Item::boxed(4.0, "C"),
            Item::forced_break(),
        ]
    }

    #[test]
    fn empty_stream_gives_empty_table() {
        let sums = PrefixSums::new::<()>(&[]);
        assert!(sums.is_empty());
        assert_eq!(sums.span(0, 0), Totals::default());
    }

    #[test]
    fn cumulative_through_each_item() {
        let sums = PrefixSums::new(&sample());
        assert_eq!(sums.len(), 6);
        assert_eq!(sums.through(0).width, 10.0);
        assert_eq!(
            sums.through(1),
            Totals {
                width: 15.0,
                stretch: 2.5,
                shrink: 1.5
            }
        );
        // Penalties add no width until broken at.
        assert_eq!(sums.through(3), sums.through(2));
        assert_eq!(sums.through(5).width, 29.0);
    }

    #[test]
    fn span_subtracts_prefix() {
        let sums = PrefixSums::new(&sample());
        assert_eq!(sums.span(0, 1).width, 10.0);
        assert_eq!(sums.span(2, 5).width, 14.0);
        assert_eq!(sums.span(1, 2).stretch, 2.5);
        assert_eq!(sums.span(4, 2), Totals::default());
    }

    #[test]
    fn widths_never_decrease() {
        let sums = PrefixSums::new(&sample());
        for i in 1..sums.len() {
            assert!(sums.through(i).width >= sums.through(i - 1).width);
        }
    }
}
