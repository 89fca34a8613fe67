use parbreak::render::render_line;
use parbreak::{Layout, Line};
use serde::Serialize;

/// Which pipeline stage produced a paragraph's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Optimal,
    Fallback,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Width of the first line.
    pub width: f64,
    /// Paragraphs that fell back to greedy wrapping.
    pub fallbacks: usize,
    pub paragraphs: Vec<ParagraphReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphReport {
    pub index: usize,
    pub mode: Mode,
    pub total_demerits: Option<f64>,
    /// Item index where the optimal search gave up.
    pub infeasible_at: Option<usize>,
    pub lines: Vec<LineReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub text: String,
    pub ratio: f64,
    pub width: f64,
    pub target: f64,
    pub fill: f64,
    pub hyphenated: bool,
}

impl ParagraphReport {
    #[must_use]
    pub fn from_layout(index: usize, layout: &Layout<&str>) -> Self {
        let (mode, total_demerits, infeasible_at) = match layout {
            Layout::Optimal { path, .. } => (Mode::Optimal, Some(path.total_demerits), None),
            Layout::Fallback { infeasible, .. } => {
                (Mode::Fallback, None, Some(infeasible.position))
            }
        };
        Self {
            index,
            mode,
            total_demerits,
            infeasible_at,
            lines: layout.lines().iter().map(LineReport::from_line).collect(),
        }
    }

    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.mode == Mode::Optimal
    }
}

impl LineReport {
    fn from_line(line: &Line<&str>) -> Self {
        Self {
            text: render_line(line),
            ratio: line.ratio,
            width: line.rendered_width(),
            target: line.target_width,
            fill: line.fill,
            hyphenated: line.hyphenated,
        }
    }
}

#[cfg(test)]
mod tests {
    use parbreak::{CellMeasure, JustifyConfig, justify_words};

    use super::{Mode, ParagraphReport};

    #[test]
    fn optimal_layout_carries_demerits() {
        let words = ["alpha", "beta", "gamma"];
        let layout = justify_words(&words, &CellMeasure, 1.0, &JustifyConfig::terminal(40.0))
            .unwrap();
        let report = ParagraphReport::from_layout(2, &layout);
        assert_eq!(report.index, 2);
        assert_eq!(report.mode, Mode::Optimal);
        assert!(report.total_demerits.is_some());
        assert!(report.infeasible_at.is_none());
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].text, "alpha beta gamma");
        assert_eq!(report.lines[0].fill, 24.0);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Fallback).unwrap(), "\"fallback\"");
    }
}
