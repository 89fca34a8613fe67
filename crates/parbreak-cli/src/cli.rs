use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use parbreak::{CachedMeasure, CellMeasure, JustifyConfig, LastLine, justify_words, render_monospace};

use crate::error::{CliError, Result};
use crate::report::{ParagraphReport, Report};

/// Widths cached per run. Prose vocabularies are small.
const MEASURE_CACHE_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Whole-cell spacing that never compresses, for terminals.
    Terminal,
    /// TeX-like defaults.
    Typographic,
}

#[derive(Debug, Parser)]
#[command(
    name = "parbreak",
    about = "Justify plain-text paragraphs with optimal line breaks",
    version
)]
pub struct Cli {
    /// Input file; reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Column width in cells.
    #[arg(short, long, default_value_t = 72.0)]
    pub width: f64,

    /// Per-line widths, comma separated; the last one repeats.
    #[arg(long, value_delimiter = ',', conflicts_with = "width")]
    pub widths: Vec<f64>,

    /// Largest adjustment ratio a line may use.
    #[arg(long)]
    pub tolerance: Option<f64>,

    #[arg(long)]
    pub line_penalty: Option<f64>,

    /// Cost of breaking at a soft hyphen (U+00AD).
    #[arg(long)]
    pub hyphen_penalty: Option<f64>,

    /// Active-node cap of the breakpoint search.
    #[arg(long)]
    pub max_active: Option<usize>,

    #[arg(long, value_enum, default_value_t = Preset::Terminal)]
    pub preset: Preset,

    /// Leave the last line of each paragraph ragged (default).
    #[arg(long, conflicts_with = "justify_last")]
    pub ragged_last: bool,

    /// Stretch the last line of each paragraph to full width as well.
    #[arg(long)]
    pub justify_last: bool,

    /// Print a JSON report instead of text.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Build the justification settings these flags describe.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidArgument`] when the settings do not
    /// validate.
    pub fn config(&self) -> Result<JustifyConfig> {
        let mut config = match self.preset {
            Preset::Terminal => JustifyConfig::terminal(self.width),
            Preset::Typographic => JustifyConfig::typographic(self.width),
        };
        if !self.widths.is_empty() {
            config = config.with_widths(self.widths.iter().copied());
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(penalty) = self.line_penalty {
            config = config.with_line_penalty(penalty);
        }
        if let Some(penalty) = self.hyphen_penalty {
            config = config.with_hyphen_penalty(penalty);
        }
        if let Some(cap) = self.max_active {
            config = config.with_max_active_nodes(cap);
        }
        if self.ragged_last {
            config = config.with_last_line(LastLine::Fill);
        } else if self.justify_last {
            config = config.with_last_line(LastLine::Justify);
        }
        config
            .validate()
            .map_err(|error| CliError::invalid(error.to_string()))?;
        Ok(config)
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => {
                std::fs::read_to_string(path).map_err(|source| CliError::Input {
                    path: path.clone(),
                    source,
                })
            }
            _ => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

/// Split `text` into paragraphs of words. Blank lines separate paragraphs.
#[must_use]
pub fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.extend(line.split_whitespace());
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Justify every paragraph of `text` and write the result to `out`.
///
/// # Errors
///
/// Fails on invalid settings, input without words, or a write error.
pub fn justify_text<W: Write>(cli: &Cli, text: &str, out: &mut W) -> Result<()> {
    let config = cli.config()?;
    let paragraphs = paragraphs(text);
    if paragraphs.is_empty() {
        return Err(CliError::EmptyInput);
    }

    let measure = CachedMeasure::new(CellMeasure, MEASURE_CACHE_CAPACITY);
    let mut report = Report::default();
    for (index, words) in paragraphs.iter().enumerate() {
        let layout = justify_words(words, &measure, 1.0, &config)
            .map_err(|source| CliError::Paragraph { index, source })?;
        tracing::debug!(
            paragraph = index,
            words = words.len(),
            lines = layout.lines().len(),
            optimal = layout.is_optimal(),
            "paragraph justified"
        );
        if cli.json {
            report.paragraphs.push(ParagraphReport::from_layout(index, &layout));
        } else {
            if index > 0 {
                writeln!(out)?;
            }
            for row in render_monospace(layout.lines()) {
                writeln!(out, "{row}")?;
            }
        }
    }

    let stats = measure.stats();
    tracing::debug!(
        hits = stats.hits,
        misses = stats.misses,
        hit_rate = stats.hit_rate(),
        "measure cache"
    );

    if cli.json {
        report.width = config.target_width(0);
        report.fallbacks = report
            .paragraphs
            .iter()
            .filter(|paragraph| !paragraph.is_optimal())
            .count();
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}

/// Read the input `cli` names and justify it into `out`.
///
/// # Errors
///
/// As [`justify_text`], plus failures reading the input.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let text = cli.read_input()?;
    justify_text(cli, &text, out)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use clap::Parser;
    use tempfile::tempdir;

    use super::{Cli, Preset, justify_text, paragraphs, run};
    use crate::error::CliError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("parbreak").chain(args.iter().copied())).unwrap()
    }

    fn output(cli: &Cli, text: &str) -> String {
        let mut out = Vec::new();
        justify_text(cli, text, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.width, 72.0);
        assert_eq!(cli.preset, Preset::Terminal);
        assert!(!cli.json);
        let config = cli.config().unwrap();
        assert_eq!(config.target_width(0), 72.0);
        assert_eq!(config.shrink_factor, 0.0);
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = parse(&[
            "--widths",
            "20,30",
            "--tolerance",
            "4",
            "--line-penalty",
            "5",
            "--hyphen-penalty",
            "80",
            "--max-active",
            "12",
            "--preset",
            "typographic",
            "--justify-last",
        ]);
        let config = cli.config().unwrap();
        assert_eq!(config.target_width(0), 20.0);
        assert_eq!(config.target_width(5), 30.0);
        assert_eq!(config.tolerance, 4.0);
        assert_eq!(config.line_penalty, 5.0);
        assert_eq!(config.hyphen_penalty, 80.0);
        assert_eq!(config.max_active_nodes, 12);
        assert_eq!(config.last_line, parbreak::LastLine::Justify);
    }

    #[test]
    fn ragged_last_selects_fill() {
        let cli = parse(&["--ragged-last"]);
        assert!(cli.ragged_last);
        let config = cli.config().unwrap();
        assert_eq!(config.last_line, parbreak::LastLine::Fill);

        // A ragged last line leaves its shortfall as fill in the report.
        let cli = parse(&["--width", "40", "--ragged-last", "--json"]);
        let report: serde_json::Value =
            serde_json::from_str(&output(&cli, "alpha beta gamma")).unwrap();
        assert_eq!(report["paragraphs"][0]["lines"][0]["fill"], 24.0);
    }

    #[test]
    fn conflicting_last_line_flags_rejected() {
        let result = Cli::try_parse_from(["parbreak", "--ragged-last", "--justify-last"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_width_is_a_usage_error() {
        let cli = parse(&["--width", "0"]);
        let error = cli.config().unwrap_err();
        assert!(matches!(error, CliError::InvalidArgument { .. }));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        let text = "one two\nthree\n\n  \nfour\n";
        assert_eq!(paragraphs(text), vec![vec!["one", "two", "three"], vec!["four"]]);
        assert!(paragraphs("\n \n").is_empty());
    }

    #[test]
    fn text_output_is_justified() {
        let cli = parse(&["--width", "16"]);
        let text = "the quick brown fox jumps over the lazy dog\n\nsecond paragraph";
        let rendered = output(&cli, text);
        let rows: Vec<&str> = rendered.lines().collect();
        let gap = rows.iter().position(|row| row.is_empty()).unwrap();
        assert!(rows[..gap].iter().all(|row| row.len() <= 16));
        assert_eq!(rows[gap + 1], "second paragraph");
        let words: Vec<&str> = rows[..gap].iter().flat_map(|row| row.split_whitespace()).collect();
        assert_eq!(words.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn json_report_lists_lines() {
        let cli = parse(&["--width", "16", "--json"]);
        let rendered = output(&cli, "the quick brown fox jumps over the lazy dog");
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["width"], 16.0);
        let paragraph = &value["paragraphs"][0];
        assert_eq!(paragraph["index"], 0);
        let lines = paragraph["lines"].as_array().unwrap();
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|line| line["ratio"].is_number()));
        let mode = paragraph["mode"].as_str().unwrap();
        assert!(mode == "optimal" || mode == "fallback");
    }

    #[test]
    fn infeasible_paragraph_reports_fallback() {
        let cli = parse(&["--width", "5", "--json"]);
        let rendered = output(&cli, "unbreakable");
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["fallbacks"], 1);
        let paragraph = &value["paragraphs"][0];
        assert_eq!(paragraph["mode"], "fallback");
        assert_eq!(paragraph["infeasible_at"], 1);
        assert!(paragraph["total_demerits"].is_null());
        assert_eq!(paragraph["lines"][0]["text"], "unbreakable");
    }

    #[test]
    fn empty_input_rejected() {
        let cli = parse(&[]);
        let mut out = Vec::new();
        let error = justify_text(&cli, "  \n\n", &mut out).unwrap_err();
        assert!(matches!(error, CliError::EmptyInput));
    }

    #[test]
    fn reads_input_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("para.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "alpha beta gamma").unwrap();
        drop(file);

        let cli = parse(&["--width", "30", path.to_str().unwrap()]);
        let mut out = Vec::new();
        run(&cli, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "alpha beta gamma\n");
    }

    #[test]
    fn missing_input_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let cli = parse(&[path.to_str().unwrap()]);
        let mut out = Vec::new();
        let error = run(&cli, &mut out).unwrap_err();
        assert!(matches!(error, CliError::Input { .. }));
        assert!(error.to_string().contains("absent.txt"));
    }
}
