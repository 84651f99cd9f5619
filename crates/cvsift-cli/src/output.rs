use std::io::Write;

use cvsift_ingest::{PipelineOutcome, PipelineWarning, TextSource};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

pub const NO_TEXT_MESSAGE: &str =
    "No extractable text found. The file might be image-based or encrypted.";

/// Print a short summary of what was extracted and how.
pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    outcome: &PipelineOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    let record = outcome.record();

    if !outcome.has_text() {
        if color.enabled() {
            writeln!(w, "{} {}", "\u{26A0}\u{FE0F}".yellow(), NO_TEXT_MESSAGE.yellow().bold())?;
        } else {
            writeln!(w, "{}", NO_TEXT_MESSAGE)?;
        }
        print_warnings(w, outcome.warnings(), color)?;
        writeln!(w)?;
        return Ok(());
    }

    let via = match outcome.source() {
        TextSource::Native => "text layer",
        TextSource::Ocr => "OCR",
        TextSource::None => "no text",
    };
    if color.enabled() {
        writeln!(w, "{} {} ({})", "Extracted".green().bold(), file_name.bold(), via.dimmed())?;
    } else {
        writeln!(w, "Extracted {} ({})", file_name, via)?;
    }

    let counts = format!(
        "{} email(s), {} phone(s), {} skill(s), {} education, {} experience, {} project line(s)",
        record.emails.len(),
        record.phones.len(),
        record.skills.len(),
        record.education.len(),
        record.experience.len(),
        record.projects.len(),
    );
    if color.enabled() {
        writeln!(w, "  {}", counts.dimmed())?;
    } else {
        writeln!(w, "  {}", counts)?;
    }

    print_warnings(w, outcome.warnings(), color)?;
    writeln!(w)?;
    Ok(())
}

fn print_warnings(
    w: &mut dyn Write,
    warnings: &[PipelineWarning],
    color: ColorMode,
) -> std::io::Result<()> {
    for warning in warnings {
        if color.enabled() {
            writeln!(w, "  {} {}", "warning:".yellow(), warning)?;
        } else {
            writeln!(w, "  warning: {}", warning)?;
        }
    }
    Ok(())
}
