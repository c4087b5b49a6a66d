/*!
 * Reporting functionality for aktool
 *
 * Renders a summary of each command as a console table using the tabled
 * library.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

/// Statistics for a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Structure artifact written
    pub structure_file: PathBuf,
    /// Separate code artifact written, if any
    pub code_file: Option<PathBuf>,
    /// Number of entries listed
    pub tree_lines: usize,
    /// Number of files dumped as code blocks
    pub code_blocks: usize,
    /// Files whose content could not be dumped
    pub failures: Vec<String>,
    /// Time taken
    pub duration: Duration,
}

/// How a rebuild ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildOutcome {
    /// Every line was processed
    #[default]
    Completed,
    /// Stopped at a conflict prompt
    Aborted,
}

/// Statistics for a rebuild run
#[derive(Debug, Clone, Default)]
pub struct RebuildReport {
    /// Directory rebuilt into
    pub target: PathBuf,
    /// Directories created
    pub dirs_created: usize,
    /// Files written
    pub files_written: usize,
    /// Files written with content from a code block
    pub files_from_code: usize,
    /// Existing entries left alone
    pub skipped: usize,
    /// Per-entry errors
    pub failures: Vec<String>,
    /// How the run ended
    pub outcome: RebuildOutcome,
    /// Time taken
    pub duration: Duration,
}

impl RebuildReport {
    /// Empty report for `target`
    pub fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
            ..Self::default()
        }
    }
}

/// Result of applying copy rules
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// File the rules were matched against
    pub source: PathBuf,
    /// Copies written
    pub written: Vec<PathBuf>,
    /// Per-rule errors
    pub failures: Vec<String>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Report generator for command results
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter;

impl Reporter {
    /// Create a new reporter
    pub fn new() -> Self {
        Self
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    fn table(&self, rows: Vec<SummaryRow>) -> String {
        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn failures(&self, failures: &[String]) -> String {
        if failures.is_empty() {
            return String::new();
        }
        let mut text = String::from("\n\n⚠️  FAILURES\n");
        for failure in failures {
            text.push_str("  - ");
            text.push_str(failure);
            text.push('\n');
        }
        text
    }

    /// Summary of a generation run
    pub fn generate_report(&self, report: &GenerateReport) -> String {
        let mut rows = vec![SummaryRow::new(
            "📂 Structure File",
            report.structure_file.display().to_string(),
        )];
        if let Some(code_file) = &report.code_file {
            rows.push(SummaryRow::new("📂 Code File", code_file.display().to_string()));
        }
        rows.push(SummaryRow::new("⏱️ Process Time", format!("{:.4?}", report.duration)));
        rows.push(SummaryRow::new("🌲 Entries Listed", self.format_number(report.tree_lines)));
        rows.push(SummaryRow::new("📄 Code Blocks", self.format_number(report.code_blocks)));
        rows.push(SummaryRow::new("❌ Failures", self.format_number(report.failures.len())));

        format!(
            "✅  STRUCTURE GENERATED\n{}{}",
            self.table(rows),
            self.failures(&report.failures)
        )
    }

    /// Summary of a rebuild run
    pub fn rebuild_report(&self, report: &RebuildReport) -> String {
        let title = match report.outcome {
            RebuildOutcome::Completed => "✅  REBUILD COMPLETE",
            RebuildOutcome::Aborted => "🛑  REBUILD ABORTED",
        };
        let rows = vec![
            SummaryRow::new("📂 Target", report.target.display().to_string()),
            SummaryRow::new("⏱️ Process Time", format!("{:.4?}", report.duration)),
            SummaryRow::new("📁 Directories Created", self.format_number(report.dirs_created)),
            SummaryRow::new(
                "📄 Files Written",
                format!(
                    "{} ({} with code)",
                    self.format_number(report.files_written),
                    self.format_number(report.files_from_code)
                ),
            ),
            SummaryRow::new("⏭️ Skipped", self.format_number(report.skipped)),
            SummaryRow::new("❌ Failures", self.format_number(report.failures.len())),
        ];

        format!("{}\n{}{}", title, self.table(rows), self.failures(&report.failures))
    }

    /// Summary of a copy run
    pub fn copy_report(&self, report: &CopyReport) -> String {
        let mut rows = vec![SummaryRow::new("📂 Source", report.source.display().to_string())];
        for written in &report.written {
            rows.push(SummaryRow::new("📄 Copy", written.display().to_string()));
        }
        rows.push(SummaryRow::new("❌ Failures", self.format_number(report.failures.len())));

        format!("✅  COPY RULES APPLIED\n{}{}", self.table(rows), self.failures(&report.failures))
    }
}
