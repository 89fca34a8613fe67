#![forbid(unsafe_code)]

//! Breakpoint graph search: the Knuth-Plass active-node dynamic program.
//!
//! # Algorithm
//!
//! Every legal break (a glue directly after a box, or a penalty cheaper than
//! [`INFINITE_PENALTY`]) is a vertex; an edge from break `a` to break `b` is
//! the line holding the items between them. The search scans items left to
//! right carrying a set of *active nodes*, each the cheapest known way to
//! end a line at some earlier break. At each candidate `i` every active node
//! proposes the line `node.position .. i`:
//!
//! ```text
//!   ratio     = (target - natural) / stretch     (natural < target)
//!             = (target - natural) / shrink      (natural > target)
//!   badness   = scale * |ratio|^exponent
//!   demerits  = (line_penalty + badness)^2 ± penalty^2
//!               + fitness_demerit   (fitness class jumps by more than one)
//!               + flagged_demerit   (two flagged breaks in a row)
//! ```
//!
//! A line with `-1 <= ratio <= tolerance` is feasible and spawns a node at
//! `i + 1`. A node whose line is over-full (`ratio < -1`) spawns nothing at
//! `i` but stays active: a later break may still fit, because a penalty's
//! width only counts when breaking at it and a glue may shrink by more than
//! its own width. The node is retired once no candidate up to the next
//! forced break could fit its line even at full shrink ([`ShrinkReach`]).
//!
//! # Pruning
//!
//! After each candidate the active set is deduplicated on
//! `(position, line)` keeping the cheapest node (first encountered on
//! ties), stably sorted by total demerits and truncated to
//! `max_active_nodes`. The truncation is an approximation: it bounds the
//! running time at the cost of occasionally discarding a currently
//! expensive node that would have won later.
//!
//! # Forced breaks
//!
//! At a forced penalty only nodes created there survive. The paragraph's
//! terminal penalty therefore leaves exactly the complete layouts, and the
//! cheapest of them is the answer. An empty active set at any point means
//! no layout fits: the search reports [`Infeasible`] rather than guessing.

use std::collections::hash_map::Entry;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::config::{JustifyConfig, LastLine};
use crate::item::{INFINITE_PENALTY, Item};
use crate::prefix::PrefixSums;

/// Natural and target widths closer than this count as a perfect fit.
pub const FIT_EPSILON: f64 = 1e-3;

// =========================================================================
// FitnessClass
// =========================================================================

/// Coarse looseness bucket of a line, from its adjustment ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FitnessClass {
    /// ratio < -0.5
    Tight = 0,
    /// -0.5 <= ratio <= 0.5
    Decent = 1,
    /// 0.5 < ratio <= 1
    Loose = 2,
    /// ratio > 1
    VeryLoose = 3,
}

impl FitnessClass {
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < -0.5 {
            Self::Tight
        } else if ratio <= 0.5 {
            Self::Decent
        } else if ratio <= 1.0 {
            Self::Loose
        } else {
            Self::VeryLoose
        }
    }

    /// Whether two adjacent lines are more than one class apart.
    #[must_use]
    pub const fn incompatible(self, other: Self) -> bool {
        let a = self as i8;
        let b = other as i8;
        (a - b > 1) || (b - a > 1)
    }
}

impl fmt::Display for FitnessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tight => write!(f, "tight"),
            Self::Decent => write!(f, "decent"),
            Self::Loose => write!(f, "loose"),
            Self::VeryLoose => write!(f, "very-loose"),
        }
    }
}

// =========================================================================
// Line fit
// =========================================================================

/// Adjustment ratio needed to bring `natural` to `target`.
///
/// Returns `+inf` when the line is short but cannot stretch and `-inf`
/// when it is long but cannot shrink.
#[must_use]
pub fn adjustment_ratio(target: f64, natural: f64, stretch: f64, shrink: f64) -> f64 {
    let slack = target - natural;
    if slack.abs() < FIT_EPSILON {
        0.0
    } else if slack > 0.0 {
        if stretch > 0.0 {
            slack / stretch
        } else {
            f64::INFINITY
        }
    } else if shrink > 0.0 {
        slack / shrink
    } else {
        f64::NEG_INFINITY
    }
}

/// Geometry of one line `start .. break_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Width at ratio 0, including the width of a penalty broken at.
    pub natural: f64,
    pub stretch: f64,
    pub shrink: f64,
    /// Adjustment ratio applied to the line's glue.
    pub ratio: f64,
    /// Space left unfilled by a ragged last line.
    pub fill: f64,
}

/// Measure the line starting at item `start` and ending by breaking at
/// item `break_index`.
///
/// The breaking glue is excluded; a breaking penalty contributes its width.
/// When the break is forced and `last_line` is [`LastLine::Fill`], a short
/// line is set at ratio 0 and the shortfall is reported as `fill`.
#[must_use]
pub fn fit_line<P>(
    items: &[Item<P>],
    sums: &PrefixSums,
    start: usize,
    break_index: usize,
    target: f64,
    last_line: LastLine,
) -> LineFit {
    let span = sums.span(start, break_index);
    let break_item = &items[break_index];
    let natural = match break_item {
        Item::Penalty { width, .. } => span.width + width,
        _ => span.width,
    };
    if break_item.is_forced_break() && last_line == LastLine::Fill && natural <= target {
        return LineFit {
            natural,
            stretch: span.stretch,
            shrink: span.shrink,
            ratio: 0.0,
            fill: target - natural,
        };
    }
    LineFit {
        natural,
        stretch: span.stretch,
        shrink: span.shrink,
        ratio: adjustment_ratio(target, natural, span.stretch, span.shrink),
        fill: 0.0,
    }
}

/// Demerits of a feasible line set at `ratio` ending at `break_item`, given
/// the predecessor's fitness class and whether it ended flagged.
#[must_use]
pub fn line_demerits<P>(
    config: &JustifyConfig,
    ratio: f64,
    break_item: &Item<P>,
    prev_fitness: FitnessClass,
    prev_flagged: bool,
) -> f64 {
    let base = config.line_penalty + config.badness(ratio);
    let mut demerits = base * base;
    if let Item::Penalty { cost, .. } = break_item {
        if *cost >= 0.0 {
            demerits += cost * cost;
        } else if *cost > -INFINITE_PENALTY {
            demerits -= cost * cost;
        }
    }
    if FitnessClass::from_ratio(ratio).incompatible(prev_fitness) {
        demerits += config.fitness_demerit;
    }
    if prev_flagged && break_item.is_flagged() {
        demerits += config.flagged_demerit;
    }
    demerits
}

/// Whether item `index` may end a line.
#[must_use]
pub fn is_candidate<P>(items: &[Item<P>], index: usize) -> bool {
    match &items[index] {
        Item::Box { .. } => false,
        Item::Glue { .. } => index > 0 && items[index - 1].is_box(),
        Item::Penalty { cost, .. } => *cost < INFINITE_PENALTY,
    }
}

// =========================================================================
// Reachability
// =========================================================================

/// Lower bounds on the width of any line that can still end at or after a
/// given item.
///
/// A line `start .. j` set at full shrink is
/// `min_width(start..j) + break_width(j)`, where `min_width` sums box widths
/// and `width - shrink` of every glue. With `floor[i]` the smallest
/// `min_width(0..j) + break_width(j)` over candidates `j >= i` up to the
/// next forced break, a line from `start` can fit a later break only if
/// `floor[i] - min_width(0..start) <= target`.
#[derive(Debug, Clone)]
pub struct ShrinkReach {
    floor: Vec<f64>,
}

impl ShrinkReach {
    #[must_use]
    pub fn new<P>(items: &[Item<P>], sums: &PrefixSums) -> Self {
        let mut floor = vec![f64::INFINITY; items.len() + 1];
        for index in (0..items.len()).rev() {
            let beyond = if items[index].is_forced_break() {
                f64::INFINITY
            } else {
                floor[index + 1]
            };
            floor[index] = if is_candidate(items, index) {
                let break_width = match &items[index] {
                    Item::Penalty { width, .. } => *width,
                    _ => 0.0,
                };
                beyond.min(Self::min_width(sums, index) + break_width)
            } else {
                beyond
            };
        }
        Self { floor }
    }

    /// Whether a line starting at `start` could still fit `target` when
    /// breaking at some candidate at or after `from`.
    #[must_use]
    pub fn can_fit(&self, sums: &PrefixSums, start: usize, from: usize, target: f64) -> bool {
        let floor = self.floor.get(from).copied().unwrap_or(f64::INFINITY);
        floor - Self::min_width(sums, start) <= target + FIT_EPSILON
    }

    fn min_width(sums: &PrefixSums, end: usize) -> f64 {
        let before = sums.before(end);
        before.width - before.shrink
    }
}

// =========================================================================
// Nodes and results
// =========================================================================

/// One state of the search: the best known way to end a line just before
/// `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointNode {
    /// Item index where the next line starts (break index + 1).
    pub position: usize,
    /// Lines set so far.
    pub line: usize,
    /// Fitness of the line ending here.
    pub fitness: FitnessClass,
    pub total_demerits: f64,
    /// Ratio of the line ending here.
    pub ratio: f64,
    /// Whether the line ending here broke at a flagged penalty.
    pub flagged: bool,
    /// Break item indices from the paragraph start to here.
    pub path: Vec<usize>,
}

impl BreakpointNode {
    /// The synthetic node before the first line.
    #[must_use]
    pub fn root() -> Self {
        Self {
            position: 0,
            line: 0,
            fitness: FitnessClass::Decent,
            total_demerits: 0.0,
            ratio: 0.0,
            flagged: false,
            path: Vec::new(),
        }
    }

    fn child(&self, break_index: usize, ratio: f64, demerits: f64, flagged: bool) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(break_index);
        Self {
            position: break_index + 1,
            line: self.line + 1,
            fitness: FitnessClass::from_ratio(ratio),
            total_demerits: self.total_demerits + demerits,
            ratio,
            flagged,
            path,
        }
    }

    fn key(&self) -> (usize, usize) {
        (self.position, self.line)
    }
}

/// The winning sequence of breaks.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakPath {
    /// Item index of every line-ending break, ascending. The last entry is
    /// the terminal forced penalty.
    pub breaks: Vec<usize>,
    pub total_demerits: f64,
}

impl BreakPath {
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.breaks.len()
    }
}

/// No layout satisfies the tolerance and the forced breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infeasible {
    /// Item index at which the last active node disappeared.
    pub position: usize,
}

impl fmt::Display for Infeasible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no feasible layout (search exhausted at item {})", self.position)
    }
}

impl std::error::Error for Infeasible {}

// =========================================================================
// Search
// =========================================================================

/// Find the minimum-demerit break sequence for `items`.
///
/// `items` must end with a forced penalty and `config` must be valid; the
/// pipeline checks both before calling.
///
/// # Errors
///
/// Returns [`Infeasible`] when every path violates the tolerance window.
pub fn search<P>(
    items: &[Item<P>],
    sums: &PrefixSums,
    config: &JustifyConfig,
) -> Result<BreakPath, Infeasible> {
    let reach = ShrinkReach::new(items, sums);
    let mut active = vec![BreakpointNode::root()];

    for (index, item) in items.iter().enumerate() {
        if !is_candidate(items, index) {
            continue;
        }
        let forced = item.is_forced_break();
        let flagged = item.is_flagged();
        let mut survivors = Vec::with_capacity(active.len());
        let mut created = Vec::new();
        let mut overfull = 0usize;
        let mut retired = 0usize;

        for node in active {
            let target = config.target_width(node.line);
            let fit = fit_line(items, sums, node.position, index, target, config.last_line);
            if fit.ratio < -1.0 {
                overfull += 1;
                if !forced && reach.can_fit(sums, node.position, index + 1, target) {
                    survivors.push(node);
                } else {
                    retired += 1;
                }
                continue;
            }
            if fit.ratio <= config.tolerance {
                let demerits = line_demerits(config, fit.ratio, item, node.fitness, node.flagged);
                created.push(node.child(index, fit.ratio, demerits, flagged));
            }
            if !forced {
                survivors.push(node);
            }
        }

        let spawned = created.len();
        let next = if forced {
            created
        } else {
            survivors.extend(created);
            survivors
        };
        active = prune(next, config.max_active_nodes);

        tracing::trace!(
            position = index,
            forced,
            spawned,
            overfull,
            retired,
            active = active.len(),
            "candidate break processed"
        );

        if active.is_empty() {
            tracing::debug!(position = index, "breakpoint search exhausted");
            return Err(Infeasible { position: index });
        }
    }

    let closed = items.last().is_some_and(Item::is_forced_break);
    match active.into_iter().next() {
        Some(best) if closed => {
            tracing::debug!(
                lines = best.line,
                total_demerits = best.total_demerits,
                "optimal breaks found"
            );
            Ok(BreakPath {
                breaks: best.path,
                total_demerits: best.total_demerits,
            })
        }
        _ => Err(Infeasible {
            position: items.len(),
        }),
    }
}

/// Keep the cheapest node per `(position, line)`, order by demerits, cap.
fn prune(nodes: Vec<BreakpointNode>, cap: usize) -> Vec<BreakpointNode> {
    let mut slots: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut kept: Vec<BreakpointNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match slots.entry(node.key()) {
            Entry::Occupied(slot) => {
                let incumbent = &mut kept[*slot.get()];
                if node.total_demerits < incumbent.total_demerits {
                    *incumbent = node;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(node);
            }
        }
    }
    kept.sort_by(|a, b| a.total_demerits.total_cmp(&b.total_demerits));
    kept.truncate(cap);
    kept
}
