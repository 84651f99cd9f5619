use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;

use cvsift_core::{EntityRecognizer, EntitySpan, NerError};

/// Environment variable naming an external NER program.
pub const NER_COMMAND_ENV: &str = "CVSIFT_NER_COMMAND";

/// Named-entity recognition delegated to an external program.
///
/// The document text is written to the program's stdin; it must print a JSON
/// array of `{"label", "text", "start_offset"}` objects (or an object with an
/// `entities` array) on stdout and exit successfully.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecognizerOutput {
    Spans(Vec<EntitySpan>),
    Wrapped { entities: Vec<EntitySpan> },
}

impl CommandRecognizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse `"program arg1 arg2"`. Returns `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts.map(str::to_string).collect()))
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl EntityRecognizer for CommandRecognizer {
    fn annotate(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    NerError::Unavailable(self.program.display().to_string())
                }
                _ => NerError::Io(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits without reading its input is not an error
            // here; its exit status and output decide.
            match stdin.write_all(text.as_bytes()) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(NerError::Io(e)),
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NerError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: RecognizerOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
            let preview: String = stdout.chars().take(200).collect();
            NerError::MalformedOutput(format!("{e} (output starts with {preview:?})"))
        })?;

        let spans = match parsed {
            RecognizerOutput::Spans(spans) => spans,
            RecognizerOutput::Wrapped { entities } => entities,
        };
        tracing::debug!(spans = spans.len(), "external recognizer finished");
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandRecognizer {
        CommandRecognizer::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn command_line_parsing() {
        let rec = CommandRecognizer::from_command_line("python3 ner.py --model sm").unwrap();
        assert_eq!(rec.program(), std::path::Path::new("python3"));
        assert_eq!(rec.args(), ["ner.py", "--model", "sm"]);
        assert!(CommandRecognizer::from_command_line("   ").is_none());
    }

    #[test]
    fn missing_program_is_unavailable() {
        let rec = CommandRecognizer::new("/nonexistent/cvsift-ner", Vec::new());
        assert!(matches!(rec.annotate("text"), Err(NerError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn parses_span_array() {
        let rec = shell(
            r#"cat >/dev/null; echo '[{"label":"PERSON","text":"Jane Doe","start_offset":0}]'"#,
        );
        let spans = rec.annotate("Jane Doe\nEngineer").unwrap();
        assert_eq!(spans, vec![EntitySpan::new("PERSON", "Jane Doe", 0)]);
    }

    #[cfg(unix)]
    #[test]
    fn parses_wrapped_entities() {
        let rec = shell(
            r#"cat >/dev/null; echo '{"entities":[{"label":"ORG","text":"ACME","start":3}]}'"#,
        );
        let spans = rec.annotate("at ACME").unwrap();
        assert_eq!(spans, vec![EntitySpan::new("ORG", "ACME", 3)]);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_failure() {
        let rec = shell("cat >/dev/null; echo boom >&2; exit 3");
        match rec.annotate("x") {
            Err(NerError::Failed(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn garbage_output_is_malformed() {
        let rec = shell("cat >/dev/null; echo not-json");
        assert!(matches!(rec.annotate("x"), Err(NerError::MalformedOutput(_))));
    }
}
