#![forbid(unsafe_code)]

//! Box / Glue / Penalty item streams.
//!
//! A paragraph enters the engine as an ordered sequence of [`Item`]s, the
//! representation from Knuth & Plass, "Breaking Paragraphs into Lines"
//! (1981):
//!
//! ```text
//!   Box("The") Glue Box("quick") Glue Box("br") Penalty(-,flagged) Box("own") ... Penalty(-inf)
//! ```
//!
//! Boxes never break. A line may end at a Glue that directly follows a Box
//! (the glue itself disappears) or at a Penalty whose cost is below
//! [`INFINITE_PENALTY`]. Every stream built here ends with a forced penalty,
//! so the last line is always closed.

use smallvec::SmallVec;

use crate::config::JustifyConfig;
use crate::error::{JustifyError, Result};
use crate::measure::Measure;

/// Penalty magnitude treated as infinite. A cost at or above it forbids the
/// break; a cost at or below its negation forces it.
pub const INFINITE_PENALTY: f64 = 10_000.0;

/// Discretionary hyphen marker accepted inside words.
pub const SOFT_HYPHEN: char = '\u{00AD}';

/// One element of the paragraph stream. `P` is the renderer's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<P> {
    /// Unbreakable content.
    Box { width: f64, payload: P },
    /// Breakable, elastic space.
    Glue { width: f64, stretch: f64, shrink: f64 },
    /// Candidate break with a cost. `width` only counts when breaking here.
    Penalty { width: f64, cost: f64, flagged: bool },
}

impl<P> Item<P> {
    #[must_use]
    pub fn boxed(width: f64, payload: P) -> Self {
        Self::Box { width, payload }
    }

    #[must_use]
    pub fn glue(width: f64, stretch: f64, shrink: f64) -> Self {
        Self::Glue {
            width,
            stretch,
            shrink,
        }
    }

    #[must_use]
    pub fn penalty(width: f64, cost: f64, flagged: bool) -> Self {
        Self::Penalty {
            width,
            cost,
            flagged,
        }
    }

    /// The mandatory end-of-paragraph break.
    #[must_use]
    pub fn forced_break() -> Self {
        Self::penalty(0.0, -INFINITE_PENALTY, false)
    }

    #[must_use]
    pub const fn is_box(&self) -> bool {
        matches!(self, Self::Box { .. })
    }

    #[must_use]
    pub const fn is_glue(&self) -> bool {
        matches!(self, Self::Glue { .. })
    }

    #[must_use]
    pub const fn is_penalty(&self) -> bool {
        matches!(self, Self::Penalty { .. })
    }

    /// A penalty that must end a line.
    #[must_use]
    pub fn is_forced_break(&self) -> bool {
        matches!(self, Self::Penalty { cost, .. } if *cost <= -INFINITE_PENALTY)
    }

    /// A flagged penalty (typically a hyphen).
    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        matches!(self, Self::Penalty { flagged: true, .. })
    }

    /// Natural width. Penalties report the width they add when taken.
    #[must_use]
    pub const fn width(&self) -> f64 {
        match self {
            Self::Box { width, .. } | Self::Glue { width, .. } | Self::Penalty { width, .. } => {
                *width
            }
        }
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&P> {
        match self {
            Self::Box { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Width of this glue at adjustment ratio `ratio`.
    ///
    /// Stretch scales linearly with the ratio; shrink is clamped at the full
    /// shrink amount, so a glue never gets narrower than `width - shrink`.
    /// Non-glue items return their natural width.
    #[must_use]
    pub fn adjusted_width(&self, ratio: f64) -> f64 {
        match self {
            Self::Glue {
                width,
                stretch,
                shrink,
            } => {
                if ratio > 0.0 {
                    width + stretch * ratio
                } else if ratio < 0.0 {
                    width + shrink * ratio.max(-1.0)
                } else {
                    *width
                }
            }
            other => other.width(),
        }
    }

    /// Check that every metric is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`JustifyError::InvalidConfiguration`] for a negative or
    /// non-finite width, stretch, shrink, or a NaN penalty cost.
    pub fn validate(&self, index: usize) -> Result<()> {
        let metrics: SmallVec<[(&str, f64); 3]> = match self {
            Self::Box { width, .. } => SmallVec::from_slice(&[("width", *width)]),
            Self::Glue {
                width,
                stretch,
                shrink,
            } => SmallVec::from_slice(&[
                ("width", *width),
                ("stretch", *stretch),
                ("shrink", *shrink),
            ]),
            Self::Penalty { width, cost, .. } => {
                if cost.is_nan() {
                    return Err(JustifyError::invalid(format!(
                        "penalty cost of item {index} is NaN"
                    )));
                }
                SmallVec::from_slice(&[("width", *width)])
            }
        };
        for (name, value) in metrics {
            if !value.is_finite() || value < 0.0 {
                return Err(JustifyError::invalid(format!(
                    "{name} of item {index} must be finite and non-negative (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// Validate an entire stream.
///
/// # Errors
///
/// See [`Item::validate`].
pub fn validate_items<P>(items: &[Item<P>]) -> Result<()> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(index, item)| item.validate(index))
}

fn checked_measure(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(JustifyError::invalid(format!(
            "measured width of {what} must be finite and non-negative (got {value})"
        )))
    }
}

// =========================================================================
// ItemStreamBuilder
// =========================================================================

/// Incremental item stream construction.
///
/// Glue is inserted automatically between adjacent words; discretionary
/// breaks join word fragments without glue.
///
/// ```
/// use parbreak::item::ItemStreamBuilder;
///
/// let mut builder = ItemStreamBuilder::new(5.0, 2.5, 1.65);
/// builder.push_word("hyph", 20.0);
/// builder.push_discretionary(5.0, 50.0);
/// builder.push_word("enate", 25.0);
/// builder.push_word("this", 20.0);
/// let items = builder.finish().unwrap();
/// assert_eq!(items.len(), 6);
/// assert!(items.last().unwrap().is_forced_break());
/// ```
#[derive(Debug, Clone)]
pub struct ItemStreamBuilder<P> {
    space_width: f64,
    stretch: f64,
    shrink: f64,
    items: Vec<Item<P>>,
    words: usize,
}

impl<P> ItemStreamBuilder<P> {
    /// Builder whose inter-word glue is `(space_width, stretch, shrink)`.
    #[must_use]
    pub fn new(space_width: f64, stretch: f64, shrink: f64) -> Self {
        Self {
            space_width,
            stretch,
            shrink,
            items: Vec::new(),
            words: 0,
        }
    }

    /// Builder whose glue follows `config`'s stretch and shrink factors.
    #[must_use]
    pub fn with_config(space_width: f64, config: &JustifyConfig) -> Self {
        Self::new(
            space_width,
            space_width * config.stretch_factor,
            space_width * config.shrink_factor,
        )
    }

    /// Append a word, preceded by glue if the previous item is a box.
    pub fn push_word(&mut self, payload: P, width: f64) -> &mut Self {
        if matches!(self.items.last(), Some(Item::Box { .. })) {
            self.items
                .push(Item::glue(self.space_width, self.stretch, self.shrink));
        }
        self.items.push(Item::boxed(width, payload));
        self.words += 1;
        self
    }

    /// Allow a flagged break after the last word fragment. The next word
    /// continues the same word without glue. Ignored unless the stream
    /// currently ends in a box.
    pub fn push_discretionary(&mut self, hyphen_width: f64, cost: f64) -> &mut Self {
        if matches!(self.items.last(), Some(Item::Box { .. })) {
            self.items.push(Item::penalty(hyphen_width, cost, true));
        }
        self
    }

    /// End the current line unconditionally. Ignored on an empty stream or
    /// directly after another forced break.
    pub fn push_forced_break(&mut self) -> &mut Self {
        let (ends_forced, ends_penalty) = match self.items.last() {
            None => return self,
            Some(item) => (item.is_forced_break(), item.is_penalty()),
        };
        if ends_forced {
            return self;
        }
        // A dangling discretionary has nothing to hyphenate.
        if ends_penalty {
            self.items.pop();
        }
        self.items.push(Item::forced_break());
        self
    }

    /// Number of words pushed so far.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words
    }

    /// Close the stream with the terminal forced break.
    ///
    /// # Errors
    ///
    /// Returns [`JustifyError::EmptyInput`] if no word was pushed.
    pub fn finish(mut self) -> Result<Vec<Item<P>>> {
        if self.words == 0 {
            return Err(JustifyError::EmptyInput);
        }
        self.push_forced_break();
        Ok(self.items)
    }
}

/// Build the item stream for a paragraph of pre-split words.
///
/// Each word becomes a box measured at `font_size`; consecutive words are
/// joined by glue of the measurer's space width, stretchable by
/// `config.stretch_factor` and shrinkable by `config.shrink_factor` of it.
/// Soft hyphens (U+00AD) inside a word become flagged penalties costing
/// `config.hyphen_penalty`, as wide as a measured `-`.
///
/// # Errors
///
/// - [`JustifyError::EmptyInput`] if `words` contains no visible text.
/// - [`JustifyError::InvalidConfiguration`] if a measurement is negative or
///   not finite.
pub fn build_items<'a, M>(
    words: &[&'a str],
    measure: &M,
    font_size: f64,
    config: &JustifyConfig,
) -> Result<Vec<Item<&'a str>>>
where
    M: Measure + ?Sized,
{
    let space = checked_measure(measure.space_width(font_size), "a space")?;
    let mut builder = ItemStreamBuilder::with_config(space, config);
    let mut hyphen_width = None;

    for &word in words {
        if !word.contains(SOFT_HYPHEN) {
            if !word.is_empty() {
                let width = checked_measure(measure.measure(word, font_size), word)?;
                builder.push_word(word, width);
            }
            continue;
        }

        let hyphen = match hyphen_width {
            Some(width) => width,
            None => {
                let width = checked_measure(measure.measure("-", font_size), "a hyphen")?;
                hyphen_width = Some(width);
                width
            }
        };
        let mut fragments = word.split(SOFT_HYPHEN).filter(|f| !f.is_empty()).peekable();
        while let Some(fragment) = fragments.next() {
            let width = checked_measure(measure.measure(fragment, font_size), fragment)?;
            builder.push_word(fragment, width);
            if fragments.peek().is_some() {
                builder.push_discretionary(hyphen, config.hyphen_penalty);
            }
        }
    }

    builder.finish()
}
