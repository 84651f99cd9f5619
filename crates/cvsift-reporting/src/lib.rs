use thiserror::Error;

pub mod export;
pub mod report;

pub use export::{ExportFormat, export_record, write_export};
pub use report::{REPORT_TITLE, TIMESTAMP_FORMAT, format_report};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}
