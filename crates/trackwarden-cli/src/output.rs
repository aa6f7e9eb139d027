//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use trackwarden_domain::{Classification, Outcome, TrackbackRecord};
use trackwarden_service::Decision;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a submission decision.
    pub fn format_decision(&self, decision: &Decision) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "outcome": decision.outcome,
                    "guid": decision.guid(),
                    "spam_verdict": decision.record.spam_verdict(),
                    "signals": decision.classification.as_ref().map(|c| &c.signals),
                    "field_errors": decision.validation.field_errors,
                    "record": decision.record,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(match decision.guid() {
                Some(guid) => format!("{} {}", decision.outcome.as_str(), guid),
                None => decision.outcome.as_str().to_string(),
            }),
            OutputFormat::Table => {
                let mut lines = vec![self.outcome_line(decision.outcome)];

                if let Some(guid) = decision.guid() {
                    lines.push(format!("GUID: {}", guid));
                }
                for (field, messages) in &decision.validation.field_errors {
                    for message in messages {
                        lines.push(self.error(&format!("{} {}", field, message)));
                    }
                }
                if let Some(classification) = &decision.classification {
                    lines.push(self.format_signals_table(classification));
                }

                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a classification.
    pub fn format_classification(&self, classification: &Classification) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(classification)?),
            OutputFormat::Quiet => Ok(classification.verdict.as_str().to_string()),
            OutputFormat::Table => Ok(self.format_signals_table(classification)),
        }
    }

    /// Format stored trackbacks.
    pub fn format_trackbacks(&self, records: &[TrackbackRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .filter_map(|r| r.guid())
                .map(|guid| guid.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No trackbacks found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["GUID", "Blog", "Title", "URL", "Verdict"]);
                for record in records {
                    let guid = record.guid().map(|g| g.to_string()).unwrap_or_default();
                    builder.push_record([
                        guid.get(..8).unwrap_or(&guid),
                        record.blog_name.as_deref().unwrap_or("-"),
                        record.title.as_deref().unwrap_or("-"),
                        record.url.as_deref().unwrap_or("-"),
                        record.spam_verdict().as_str(),
                    ]);
                }

                Ok(self.styled(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn outcome_line(&self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Accepted => self.success("Accepted"),
            Outcome::QueuedForModeration => self.warning("Queued for moderation"),
            Outcome::RejectedInvalid => self.error("Rejected: invalid"),
            Outcome::RejectedSpam => self.error("Rejected: spam"),
        }
    }

    fn format_signals_table(&self, classification: &Classification) -> String {
        let verdict = format!("Verdict: {}", classification.verdict.as_str());
        if classification.signals.is_empty() {
            return self.colorize(&verdict, "green");
        }

        let mut builder = Builder::default();
        builder.push_record(["Signal", "Detail"]);
        for triggered in &classification.signals {
            builder.push_record([triggered.signal.as_str(), triggered.detail.as_str()]);
        }

        format!("{}\n{}", self.colorize(&verdict, "red"), self.styled(builder))
    }

    fn styled(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
