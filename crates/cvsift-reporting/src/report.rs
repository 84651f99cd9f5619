use chrono::NaiveDateTime;

use cvsift_core::{CandidateRecord, NOT_FOUND};

pub const REPORT_TITLE: &str = "==== AI Resume Parser Report ====";

/// `strftime` pattern for the "Generated on" line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the plain-text report for `record`.
///
/// The layout is consumed by downstream tooling, so section headers, bullet
/// markers and the "Not Found" sentinel are fixed. There is no trailing
/// newline after the projects section.
pub fn format_report(record: &CandidateRecord, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Generated on: {}\n\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));

    out.push_str(&format!("\u{1F464} Name: {}\n", record.name));
    out.push_str(&format!("\u{1F4E7} Email(s): {}\n", inline_list(&record.emails)));
    out.push_str(&format!("\u{1F4F1} Phone(s): {}\n", inline_list(&record.phones)));

    out.push_str("\n\u{1F6E0}\u{FE0F} Skills:");
    push_bullets(&mut out, record.skills.iter());
    // No space between the emoji and "Education" here.
    out.push_str("\n\u{1F393}Education:");
    push_bullets(&mut out, record.education.iter());
    out.push_str("\n\u{1F4BC} Experience:");
    push_bullets(&mut out, record.experience.iter());
    out.push_str("\n\u{1F4C2} Projects:");
    push_bullets(&mut out, record.projects.iter());

    out
}

fn inline_list(items: &[String]) -> String {
    if items.is_empty() {
        NOT_FOUND.to_string()
    } else {
        items.join(", ")
    }
}

fn push_bullets<'a>(out: &mut String, items: impl Iterator<Item = &'a String>) {
    let mut any = false;
    for item in items {
        out.push_str("\n- ");
        out.push_str(item);
        any = true;
    }
    if !any {
        out.push_str("\n- ");
        out.push_str(NOT_FOUND);
    }
}
