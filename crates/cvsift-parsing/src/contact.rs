//! Email and phone extraction.
//!
//! Both extractors are plain pattern scans: every match is returned in
//! document order and nothing is deduplicated.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").unwrap());

// Optional country code, optional (area) group, then two 3-4 digit groups.
// Loose on purpose: any digit run shaped like a phone number matches.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:\+?\d{1,3})?[\s-]?)?(?:\(?\d{3,4}\)?[\s-]?)?\d{3,4}[\s-]?\d{3,4}").unwrap()
});

/// Every email address in `text`, duplicates preserved.
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Every phone-like digit sequence in `text`, duplicates preserved.
///
/// Matches keep their surrounding separators exactly as written, including a
/// leading space or hyphen picked up by the optional country-code group.
pub fn extract_phones(text: &str) -> Vec<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Emails and phones in one pass over the same text.
pub fn extract_contact(text: &str) -> (Vec<String>, Vec<String>) {
    (extract_emails(text), extract_phones(text))
}
