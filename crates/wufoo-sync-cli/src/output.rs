//! Output formatting and writing utilities
//!
//! Results are written as JSON, YAML or human-readable tables. Machine
//! formats serialize the report types below as-is; the human format renders
//! them as tables.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, trace};
use wufoo_sync_core::inflector::field_name_for_title;
use wufoo_sync_core::{form_value, FormFieldDescriptor, Reconciliation, SaveOutcome, TitleMap};

/// Longest value shown in a table cell
const MAX_CELL_WIDTH: usize = 40;

/// A form's descriptors and the title map built from them
#[derive(Debug, Clone, Serialize)]
pub struct FieldsReport {
    pub form: String,
    pub fields: Vec<FormFieldDescriptor>,
    pub titles: TitleMap,
}

/// Result of pushing one record
#[derive(Debug, Clone, Serialize)]
pub struct PushReport {
    pub form: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub created: bool,
    pub outcome: SaveOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<Reconciliation>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub validation_errors: IndexMap<String, String>,
}

/// Trait for formatting output with specialized support for the reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a form's title map
    fn format_fields_report(&self, report: &FieldsReport) -> Result<String>;

    /// Format how a record maps onto a form
    fn format_reconciliation(&self, reconciliation: &Reconciliation) -> Result<String>;

    /// Format the result of a push
    fn format_push_report(&self, report: &PushReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_fields_report(&self, report: &FieldsReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_fields_report_human(report)),
            _ => self.format(report),
        }
    }

    fn format_reconciliation(&self, reconciliation: &Reconciliation) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_reconciliation_human(reconciliation)),
            _ => self.format(reconciliation),
        }
    }

    fn format_push_report(&self, report: &PushReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_push_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let mut value_json = serde_json::to_value(value)?;
            redaction::redact_json_value(&mut value_json);
            trace!("Outputting data: {}", value_json);
        }

        let formatted = self.format.format(value)?;
        self.write_formatted(&formatted)
    }

    /// Write a form's title map
    pub fn fields_report(&mut self, report: &FieldsReport) -> Result<()> {
        let formatted = self.format.format_fields_report(report)?;
        self.write_formatted(&formatted)
    }

    /// Write how a record maps onto a form
    pub fn reconciliation(&mut self, reconciliation: &Reconciliation) -> Result<()> {
        let formatted = self.format.format_reconciliation(reconciliation)?;
        self.write_formatted(&formatted)
    }

    /// Write the result of a push
    pub fn push_report(&mut self, report: &PushReport) -> Result<()> {
        let formatted = self.format.format_push_report(report)?;
        self.write_formatted(&formatted)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    fn write_formatted(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Format a form's title map for human reading
fn format_fields_report_human(report: &FieldsReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Form '{}': {} field(s), {} title(s)\n\n",
        report.form,
        report.fields.len(),
        report.titles.len()
    ));

    if report.titles.is_empty() {
        output.push_str("No fields to match against\n");
        return output;
    }

    let rows = report
        .titles
        .iter()
        .map(|(title, id)| {
            vec![
                title.to_string(),
                id.to_string(),
                field_name_for_title(title),
            ]
        })
        .collect::<Vec<_>>();
    output.push_str(&render_table(&["Title", "ID", "Record field"], &rows));

    output
}

/// Format a reconciliation for human reading
fn format_reconciliation_human(reconciliation: &Reconciliation) -> String {
    let mut output = String::new();

    if reconciliation.matches.is_empty() {
        output.push_str("No record fields match the form\n");
    } else {
        let rows = reconciliation
            .matches
            .iter()
            .map(|m| {
                let value = reconciliation
                    .payload
                    .get(&m.remote_id)
                    .map(form_value)
                    .unwrap_or_default();
                vec![
                    m.field.clone(),
                    format!("{:?}", m.kind).to_lowercase(),
                    m.title.clone(),
                    m.remote_id.clone(),
                    truncate(&value, MAX_CELL_WIDTH),
                ]
            })
            .collect::<Vec<_>>();
        output.push_str(&render_table(
            &["Record field", "Match", "Form title", "ID", "Value"],
            &rows,
        ));
    }

    if !reconciliation.dropped.is_empty() {
        output.push_str(&format!(
            "\nNot submitted (no matching form field): {}\n",
            reconciliation.dropped.join(", ")
        ));
    }

    output
}

/// Format a push result for human reading
fn format_push_report_human(report: &PushReport) -> String {
    let mut output = String::new();

    let action = if report.created { "new record" } else { "updated record" };
    match &report.outcome {
        SaveOutcome::Saved { entry_id } => {
            output.push_str(&format!(
                "✓ Saved {} as entry {} of form '{}'\n",
                action, entry_id, report.form
            ));
        }
        SaveOutcome::Rejected {
            invalid_fields,
            error_text,
        } => {
            output.push_str(&format!("✗ Form '{}' rejected the {}\n", report.form, action));
            if let Some(text) = error_text {
                output.push_str(&format!("  {}\n", text));
            }
            if report.validation_errors.is_empty() && !invalid_fields.is_empty() {
                for field in invalid_fields {
                    output.push_str(&format!("  • {}\n", field));
                }
            }
        }
    }

    for (field, message) in &report.validation_errors {
        output.push_str(&format!("  • {}: {}\n", field, message));
    }

    if let Some(reconciliation) = &report.reconciliation {
        output.push('\n');
        output.push_str(&format_reconciliation_human(reconciliation));
    }

    output
}

/// Render rows as an aligned table
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut output = String::new();
    output.push_str(&line(headers.to_vec()));
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    output.push('\n');
    for row in rows {
        output.push_str(&line(row.iter().map(String::as_str).collect()));
        output.push('\n');
    }
    output
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let kept: String = value.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
