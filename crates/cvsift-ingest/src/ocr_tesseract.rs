use std::path::PathBuf;
use std::process::Command;

use cvsift_core::{OcrEngine, OcrError, PageImage};

/// Environment variable overriding the tesseract executable.
pub const TESSERACT_ENV: &str = "CVSIFT_TESSERACT";

/// OCR through the `tesseract` command-line program.
///
/// Each page is written as a PNG into a private temp directory and
/// recognized with `tesseract <png> stdout -l <lang>`.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// Whether the executable can be launched at all.
    pub fn is_available(&self) -> bool {
        let available = Command::new(&self.program)
            .arg("--version")
            .output()
            .is_ok();
        if !available {
            tracing::debug!(
                program = %self.program.display(),
                "tesseract not found; install tesseract-ocr for OCR support"
            );
        }
        available
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &PageImage, language: &str) -> Result<String, OcrError> {
        let temp_dir = tempfile::tempdir()?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::Encode(e.to_string()))?;

        let output = Command::new(&self.program)
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    OcrError::Unavailable(self.program.display().to_string())
                }
                _ => OcrError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
