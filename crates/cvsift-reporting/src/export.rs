use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use cvsift_core::{CandidateRecord, NOT_FOUND};

use crate::ReportError;
use crate::report::{TIMESTAMP_FORMAT, format_report};

/// Output format for an extracted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// The fixed plain-text report.
    #[default]
    Text,
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    record: &'a CandidateRecord,
}

/// Render `record` in the requested format.
pub fn export_record(
    record: &CandidateRecord,
    generated_at: NaiveDateTime,
    format: ExportFormat,
) -> Result<String, ReportError> {
    match format {
        ExportFormat::Text => Ok(format_report(record, generated_at)),
        ExportFormat::Json => export_json(record, generated_at),
        ExportFormat::Markdown => Ok(export_markdown(record, generated_at)),
    }
}

/// Render `record` and write it to `path`, replacing any existing file.
pub fn write_export(
    record: &CandidateRecord,
    generated_at: NaiveDateTime,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let content = export_record(record, generated_at, format)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn export_json(record: &CandidateRecord, generated_at: NaiveDateTime) -> Result<String, ReportError> {
    let report = JsonReport {
        generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
        record,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Escape characters that would otherwise be read as Markdown syntax.
fn md_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '`' | '[' | ']' | '#' | '|' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn export_markdown(record: &CandidateRecord, generated_at: NaiveDateTime) -> String {
    let mut out = format!("# {}\n\n", md_escape(&record.name));
    out.push_str(&format!(
        "_Generated on {}_\n\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));

    let inline = |items: &[String]| {
        if items.is_empty() {
            NOT_FOUND.to_string()
        } else {
            items.iter().map(|s| md_escape(s)).collect::<Vec<_>>().join(", ")
        }
    };
    out.push_str(&format!("- **Email(s):** {}\n", inline(record.emails.as_slice())));
    out.push_str(&format!("- **Phone(s):** {}\n", inline(record.phones.as_slice())));

    let sections: [(&str, Vec<&String>); 4] = [
        ("Skills", record.skills.iter().collect()),
        ("Education", record.education.iter().collect()),
        ("Experience", record.experience.iter().collect()),
        ("Projects", record.projects.iter().collect()),
    ];
    for (title, items) in sections {
        out.push_str(&format!("\n## {title}\n\n"));
        if items.is_empty() {
            out.push_str(&format!("- {NOT_FOUND}\n"));
        }
        for item in items {
            out.push_str(&format!("- {}\n", md_escape(item)));
        }
    }

    out
}
