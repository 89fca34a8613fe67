#![forbid(unsafe_code)]

//! Error taxonomy for the justification pipeline.
//!
//! Only configuration and input problems reach the caller. A paragraph that
//! has no feasible optimal layout is not an error: the pipeline recovers by
//! falling back to greedy wrapping (see [`crate::pipeline`]).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JustifyError>;

/// Errors surfaced by [`crate::justify`] and the item builders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JustifyError {
    /// No words were supplied. Blank paragraphs must be handled by the caller.
    #[error("no words to justify")]
    EmptyInput,

    /// A target width, policy value or measurement is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl JustifyError {
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Whether this error came from configuration rather than input content.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}
