#![cfg_attr(not(test), forbid(unsafe_code))]

//! Optimal paragraph line breaking and justification.
//!
//! # Role in parbreak
//! `parbreak` chooses where a paragraph breaks into lines so that the
//! spacing across the whole paragraph is as even as possible, instead of
//! filling each line greedily and leaving the damage to the last ones.
//!
//! # Primary responsibilities
//! - **Item streams**: words become boxes, spaces become stretchable glue,
//!   and break opportunities become penalties ([`item`]).
//! - **Prefix sums**: constant-time width, stretch, and shrink of any line
//!   ([`prefix`]).
//! - **Breakpoint search**: bounded active-node dynamic programming over
//!   candidate breaks, minimizing total demerits ([`search`]).
//! - **Formatting**: concrete lines with their adjustment ratios
//!   ([`format`]), plus a cell-grid renderer for terminals ([`render`]).
//! - **Degraded mode**: first-fit wrapping when no feasible layout exists
//!   ([`greedy`]).
//!
//! # How it fits together
//! [`justify_words`] measures words with a [`Measure`], builds the item
//! stream, and hands it to [`justify`]. The result is a [`Layout`] tagged
//! with the stage that produced it, so callers can tell a degraded layout
//! from an optimal one without any error handling.
//!
//! ```
//! use parbreak::{CellMeasure, JustifyConfig, justify_words, render_monospace};
//!
//! let words: Vec<&str> = "a short paragraph to set".split(' ').collect();
//! let layout = justify_words(&words, &CellMeasure, 1.0, &JustifyConfig::terminal(12.0))?;
//! for row in render_monospace(layout.lines()) {
//!     assert!(row.len() <= 12);
//! }
//! # Ok::<(), parbreak::JustifyError>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod greedy;
pub mod item;
pub mod measure;
pub mod pipeline;
pub mod prefix;
pub mod render;
pub mod search;

pub use config::{JustifyConfig, LastLine};
pub use error::{JustifyError, Result};
pub use format::{Line, format_lines};
pub use greedy::wrap_greedy;
pub use item::{INFINITE_PENALTY, Item, ItemStreamBuilder, build_items};
pub use measure::{CachedMeasure, CellMeasure, Measure, MeasureCacheStats};
pub use pipeline::{Layout, justify, justify_words};
pub use prefix::PrefixSums;
pub use render::render_monospace;
pub use search::{BreakPath, FitnessClass, Infeasible, search};
