#![forbid(unsafe_code)]

//! Per-paragraph justification settings.
//!
//! [`JustifyConfig`] gathers every tunable of the pipeline in one place: the
//! target width(s), the feasibility tolerance, the TeX-style penalties and
//! the policy constants that shape the search (fitness demerit, active-node
//! cap, badness curve). Defaults follow TeX where TeX has an opinion.
//!
//! # Example
//! ```
//! use parbreak::config::{JustifyConfig, LastLine};
//!
//! let config = JustifyConfig::new(42.0)
//!     .with_tolerance(3.0)
//!     .with_last_line(LastLine::Justify);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.target_width(7), 42.0);
//! ```

use std::fmt;

use smallvec::{SmallVec, smallvec};

use crate::error::{JustifyError, Result};

/// Default maximum acceptable adjustment ratio.
pub const DEFAULT_TOLERANCE: f64 = 2.0;
/// Default cost of breaking at a discretionary hyphen (TeX `\hyphenpenalty`).
pub const DEFAULT_HYPHEN_PENALTY: f64 = 50.0;
/// Default per-line penalty (TeX `\linepenalty`).
pub const DEFAULT_LINE_PENALTY: f64 = 10.0;
/// Default demerit for adjacent lines more than one fitness class apart.
pub const DEFAULT_FITNESS_DEMERIT: f64 = 100.0;
/// Default demerit for two consecutive flagged breaks (TeX `\doublehyphendemerits`).
pub const DEFAULT_FLAGGED_DEMERIT: f64 = 100.0;
/// Default bound on the active-node working set.
pub const DEFAULT_MAX_ACTIVE_NODES: usize = 30;
/// Default multiplier of the badness curve.
pub const DEFAULT_BADNESS_SCALE: f64 = 100.0;
/// Default exponent of the badness curve.
pub const DEFAULT_BADNESS_EXPONENT: i32 = 3;
/// Glue stretch as a fraction of the space width.
pub const DEFAULT_STRETCH_FACTOR: f64 = 0.5;
/// Glue shrink as a fraction of the space width.
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.33;
/// Column width used by [`JustifyConfig::default`].
pub const DEFAULT_WIDTH: f64 = 80.0;

/// How the line ended by a forced break (the paragraph's last line) is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LastLine {
    /// A short last line is left-aligned; the leftover space is fill.
    #[default]
    Fill,
    /// The last line must reach the target like any other line.
    Justify,
}

impl fmt::Display for LastLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fill => write!(f, "fill"),
            Self::Justify => write!(f, "justify"),
        }
    }
}

/// Configuration for one justification call.
#[derive(Debug, Clone, PartialEq)]
pub struct JustifyConfig {
    /// Target width of each line. Line `k` uses `widths[min(k, len - 1)]`,
    /// so a single entry applies to every line.
    pub widths: SmallVec<[f64; 4]>,

    /// Maximum adjustment ratio a line may use. Default: 2.0.
    pub tolerance: f64,

    /// Added to every line's badness before squaring. Higher values prefer
    /// fewer lines. Default: 10.
    pub line_penalty: f64,

    /// Cost attached to discretionary hyphen breaks. Default: 50.
    pub hyphen_penalty: f64,

    /// Extra demerit when consecutive lines differ by more than one fitness
    /// class. Default: 100.
    pub fitness_demerit: f64,

    /// Extra demerit when two consecutive lines both end at flagged
    /// penalties. Default: 100.
    pub flagged_demerit: f64,

    /// Active nodes kept after each candidate break. Default: 30.
    pub max_active_nodes: usize,

    /// Badness is `badness_scale * |ratio|^badness_exponent`. Default: 100.
    pub badness_scale: f64,

    /// Default: 3.
    pub badness_exponent: i32,

    /// Inter-word glue stretch, relative to the space width. Default: 0.5.
    pub stretch_factor: f64,

    /// Inter-word glue shrink, relative to the space width. Default: 0.33.
    pub shrink_factor: f64,

    /// Treatment of the line ended by a forced break. Default: [`LastLine::Fill`].
    pub last_line: LastLine,
}

impl Default for JustifyConfig {
    fn default() -> Self {
        Self {
            widths: smallvec![DEFAULT_WIDTH],
            tolerance: DEFAULT_TOLERANCE,
            line_penalty: DEFAULT_LINE_PENALTY,
            hyphen_penalty: DEFAULT_HYPHEN_PENALTY,
            fitness_demerit: DEFAULT_FITNESS_DEMERIT,
            flagged_demerit: DEFAULT_FLAGGED_DEMERIT,
            max_active_nodes: DEFAULT_MAX_ACTIVE_NODES,
            badness_scale: DEFAULT_BADNESS_SCALE,
            badness_exponent: DEFAULT_BADNESS_EXPONENT,
            stretch_factor: DEFAULT_STRETCH_FACTOR,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            last_line: LastLine::Fill,
        }
    }
}

impl JustifyConfig {
    /// Default settings with a single target width.
    #[must_use]
    pub fn new(width: f64) -> Self {
        Self {
            widths: smallvec![width],
            ..Self::default()
        }
    }

    /// TeX-like defaults for proportional typography.
    #[must_use]
    pub fn typographic(width: f64) -> Self {
        Self::new(width)
    }

    /// Preset for monospace terminal output, where spaces can widen by whole
    /// cells but never compress.
    #[must_use]
    pub fn terminal(width: f64) -> Self {
        Self {
            // Terminals prefer fewer lines.
            line_penalty: 20.0,
            fitness_demerit: 50.0,
            tolerance: 3.0,
            shrink_factor: 0.0,
            ..Self::new(width)
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.widths = smallvec![width];
        self
    }

    /// Set a per-line width sequence; the last entry repeats.
    #[must_use]
    pub fn with_widths(mut self, widths: impl IntoIterator<Item = f64>) -> Self {
        self.widths = widths.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_line_penalty(mut self, penalty: f64) -> Self {
        self.line_penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_hyphen_penalty(mut self, penalty: f64) -> Self {
        self.hyphen_penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_fitness_demerit(mut self, demerit: f64) -> Self {
        self.fitness_demerit = demerit;
        self
    }

    #[must_use]
    pub fn with_flagged_demerit(mut self, demerit: f64) -> Self {
        self.flagged_demerit = demerit;
        self
    }

    #[must_use]
    pub fn with_max_active_nodes(mut self, cap: usize) -> Self {
        self.max_active_nodes = cap;
        self
    }

    #[must_use]
    pub fn with_badness(mut self, scale: f64, exponent: i32) -> Self {
        self.badness_scale = scale;
        self.badness_exponent = exponent;
        self
    }

    #[must_use]
    pub fn with_glue_factors(mut self, stretch: f64, shrink: f64) -> Self {
        self.stretch_factor = stretch;
        self.shrink_factor = shrink;
        self
    }

    #[must_use]
    pub fn with_last_line(mut self, last_line: LastLine) -> Self {
        self.last_line = last_line;
        self
    }

    /// Target width of line `line` (0-based).
    #[must_use]
    pub fn target_width(&self, line: usize) -> f64 {
        match self.widths.last() {
            Some(&last) => self.widths.get(line).copied().unwrap_or(last),
            None => 0.0,
        }
    }

    /// Badness of a line set at `ratio`.
    #[must_use]
    pub fn badness(&self, ratio: f64) -> f64 {
        self.badness_scale * ratio.abs().powi(self.badness_exponent)
    }

    /// Reject settings the search cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`JustifyError::InvalidConfiguration`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<()> {
        if self.widths.is_empty() {
            return Err(JustifyError::invalid("at least one target width is required"));
        }
        for (line, &width) in self.widths.iter().enumerate() {
            if !width.is_finite() || width <= 0.0 {
                return Err(JustifyError::invalid(format!(
                    "target width for line {line} must be positive and finite (got {width})"
                )));
            }
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(JustifyError::invalid(format!(
                "tolerance must be finite and non-negative (got {})",
                self.tolerance
            )));
        }
        for (name, value) in [
            ("line_penalty", self.line_penalty),
            ("hyphen_penalty", self.hyphen_penalty),
        ] {
            if !value.is_finite() {
                return Err(JustifyError::invalid(format!(
                    "{name} must be finite (got {value})"
                )));
            }
        }
        for (name, value) in [
            ("fitness_demerit", self.fitness_demerit),
            ("flagged_demerit", self.flagged_demerit),
            ("stretch_factor", self.stretch_factor),
            ("shrink_factor", self.shrink_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(JustifyError::invalid(format!(
                    "{name} must be finite and non-negative (got {value})"
                )));
            }
        }
        if !self.badness_scale.is_finite() || self.badness_scale <= 0.0 {
            return Err(JustifyError::invalid(format!(
                "badness_scale must be positive and finite (got {})",
                self.badness_scale
            )));
        }
        if self.badness_exponent < 1 {
            return Err(JustifyError::invalid(format!(
                "badness_exponent must be at least 1 (got {})",
                self.badness_exponent
            )));
        }
        if self.max_active_nodes == 0 {
            return Err(JustifyError::invalid("max_active_nodes must be at least 1"));
        }
        Ok(())
    }
}
