use super::OcrEngine;
use crate::scratch::{ScratchImage, quiet_output, tool_available};
use image::DynamicImage;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use tracing::warn;

/// OCR through the `tesseract` command-line tool.
///
/// Availability is checked once at construction.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    scratch_dir: Option<PathBuf>,
    available: bool,
}

impl TesseractCli {
    /// `tesseract` from `PATH`
    pub fn new(scratch_dir: Option<PathBuf>) -> Self {
        Self::with_program("tesseract", scratch_dir)
    }

    /// A specific executable
    pub fn with_program(program: impl Into<String>, scratch_dir: Option<PathBuf>) -> Self {
        let program = program.into();
        let available = tool_available(&program);
        Self {
            program,
            scratch_dir,
            available,
        }
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize_text(&self, image: &DynamicImage) -> io::Result<String> {
        let scratch = ScratchImage::write(image, self.scratch_dir.as_deref())?;
        let output = quiet_output(Command::new(&self.program).arg(scratch.path()).arg("stdout"));
        if let Err(err) = scratch.release() {
            warn!(error = %err, "failed to remove scratch image");
        }

        let output = output?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
