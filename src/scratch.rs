//! Scoped scratch files and quiet subprocess execution
//!
//! Some decode primitives only accept a file path. A [`ScratchImage`] holds a
//! rendering on disk for exactly one call and is removed on every exit path:
//! explicitly through [`ScratchImage::release`], or on drop (including unwinds).

use crate::utils::grayscale::to_gray;
use image::{DynamicImage, ImageFormat};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;
use tracing::warn;

/// File name prefix of every scratch image; batch discovery skips these
pub const SCRATCH_PREFIX: &str = "barscan-tmp-";

/// A grayscale PNG rendering living on disk for the duration of one call
#[derive(Debug)]
pub struct ScratchImage {
    file: Option<NamedTempFile>,
}

impl ScratchImage {
    /// Write `image` to a fresh scratch file in `dir` (system temp dir if `None`)
    pub fn write(image: &DynamicImage, dir: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX).suffix(".png");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        // Owned before encoding so a failed write still cleans up on drop
        let scratch = Self { file: Some(file) };

        if let Some(file) = scratch.file.as_ref() {
            let mut writer = BufWriter::new(file.as_file());
            to_gray(image)
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(io::Error::other)?;
            writer.flush()?;
        }

        Ok(scratch)
    }

    /// Location of the scratch file
    pub fn path(&self) -> &Path {
        match self.file.as_ref() {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    /// Delete the file now, reporting failure
    pub fn release(mut self) -> io::Result<()> {
        match self.file.take() {
            Some(file) => file.close(),
            None => Ok(()),
        }
    }
}

impl Drop for ScratchImage {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            if let Err(err) = file.close() {
                warn!(path = %path.display(), error = %err, "failed to remove scratch image");
            }
        }
    }
}

/// Run `command` with its diagnostic stream discarded, capturing stdout.
///
/// Only this child's stderr is silenced; the process-wide streams are left
/// alone.
pub fn quiet_output(command: &mut Command) -> io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
}

/// Whether `program --version` runs and exits successfully
pub fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
