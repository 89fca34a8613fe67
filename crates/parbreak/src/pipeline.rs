#![forbid(unsafe_code)]

//! The two-stage justification pipeline.
//!
//! ```text
//!   validate ─▶ prefix sums ─▶ search ──ok──▶ format ─▶ Layout::Optimal
//!                                 │
//!                                 └─infeasible─▶ greedy ─▶ Layout::Fallback
//! ```
//!
//! Configuration problems are rejected before any work starts. A paragraph
//! without a feasible optimal layout is never an error: it degrades to
//! greedy wrapping, and the returned [`Layout`] says which stage produced
//! the lines.

use crate::config::JustifyConfig;
use crate::error::{JustifyError, Result};
use crate::format::{Line, format_lines};
use crate::greedy::wrap_greedy;
use crate::item::{Item, build_items, validate_items};
use crate::measure::Measure;
use crate::prefix::PrefixSums;
use crate::search::{BreakPath, Infeasible, search};

/// Laid-out paragraph, tagged with the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout<P> {
    /// The minimum-demerit layout.
    Optimal { path: BreakPath, lines: Vec<Line<P>> },
    /// Greedy wrapping after the search found no feasible layout.
    Fallback {
        lines: Vec<Line<P>>,
        infeasible: Infeasible,
    },
}

impl<P> Layout<P> {
    #[must_use]
    pub fn lines(&self) -> &[Line<P>] {
        match self {
            Self::Optimal { lines, .. } | Self::Fallback { lines, .. } => lines,
        }
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<Line<P>> {
        match self {
            Self::Optimal { lines, .. } | Self::Fallback { lines, .. } => lines,
        }
    }

    #[must_use]
    pub const fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal { .. })
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The winning break path, if the optimal search succeeded.
    #[must_use]
    pub const fn path(&self) -> Option<&BreakPath> {
        match self {
            Self::Optimal { path, .. } => Some(path),
            Self::Fallback { .. } => None,
        }
    }
}

/// Justify a prepared item stream.
///
/// # Errors
///
/// - [`JustifyError::InvalidConfiguration`] for an invalid `config`, bad
///   item metrics, or a stream that does not end in a forced break.
/// - [`JustifyError::EmptyInput`] if the stream holds no box.
pub fn justify<P: Clone>(items: &[Item<P>], config: &JustifyConfig) -> Result<Layout<P>> {
    config.validate()?;
    if !items.iter().any(Item::is_box) {
        return Err(JustifyError::EmptyInput);
    }
    validate_items(items)?;
    if !items.last().is_some_and(Item::is_forced_break) {
        return Err(JustifyError::invalid(
            "item stream must end with a forced break",
        ));
    }

    let sums = PrefixSums::new(items);
    match search(items, &sums, config) {
        Ok(path) => {
            let lines = format_lines(items, &path.breaks, &sums, config);
            Ok(Layout::Optimal { path, lines })
        }
        Err(infeasible) => {
            tracing::warn!(
                position = infeasible.position,
                items = items.len(),
                tolerance = config.tolerance,
                "no feasible optimal layout, falling back to greedy wrapping"
            );
            Ok(Layout::Fallback {
                lines: wrap_greedy(items, config),
                infeasible,
            })
        }
    }
}

/// Measure `words` and justify them.
///
/// # Errors
///
/// As [`justify`] and [`build_items`]; the configuration is checked before
/// anything is measured.
pub fn justify_words<'a, M>(
    words: &[&'a str],
    measure: &M,
    font_size: f64,
    config: &JustifyConfig,
) -> Result<Layout<&'a str>>
where
    M: Measure + ?Sized,
{
    config.validate()?;
    let items = build_items(words, measure, font_size, config)?;
    justify(&items, config)
}
