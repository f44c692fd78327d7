//! Fast backend: the `tesseract` binary run as a subprocess.
//!
//! The page image is written as a lossless PNG into a temp file (tesseract
//! needs a path, and JPEG artefacts on rendered text hurt recognition), then
//! `tesseract <png> stdout -l <langs>` is invoked with `TESSDATA_PREFIX`
//! pointed at the configured traineddata directory. Stdout is the extracted
//! text.
//!
//! Everything here is blocking; callers run it through `spawn_blocking`.

use crate::error::PipelineError;
use image::DynamicImage;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Configuration and invocation of the tesseract subprocess.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    cmd: String,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractBackend {
    /// `cmd` is a binary name resolved through `PATH`, or an absolute path.
    pub fn new(cmd: &str, tessdata_dir: Option<PathBuf>) -> Self {
        Self {
            cmd: cmd.to_string(),
            tessdata_dir,
        }
    }

    /// Check that the binary can run at all, via `tesseract --version`.
    ///
    /// Called once per request before the page loop, so a missing binary is
    /// one fatal error instead of N per-page ones.
    pub fn probe(&self) -> Result<(), PipelineError> {
        let unavailable = |hint: String| PipelineError::EngineUnavailable {
            engine: "fast".to_string(),
            hint,
        };

        match self.command().arg("--version").output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(unavailable(format!(
                "'{} --version' failed: {}",
                self.cmd,
                String::from_utf8_lossy(&out.stderr).trim()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(unavailable(format!(
                "Binary '{}' was not found.\n\
                 Install tesseract (https://tesseract-ocr.github.io/tessdoc/Installation.html)\n\
                 or point --tesseract-cmd / TEXTLIFT_TESSERACT_CMD at the binary.",
                self.cmd
            ))),
            Err(e) => Err(unavailable(format!("Cannot run '{}': {e}", self.cmd))),
        }
    }

    /// Run tesseract on one page image. Blocking.
    ///
    /// `lang_arg` is the already-joined `-l` value (e.g. `"eng+fas"`).
    /// Returns the raw stdout text; errors are detail strings for the
    /// caller's per-page [`crate::error::PageError`].
    pub fn recognize(&self, image: &DynamicImage, lang_arg: &str) -> Result<String, String> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| format!("PNG encode failed: {e}"))?;

        let mut tmp = tempfile::Builder::new()
            .prefix("textlift-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| format!("temp image: {e}"))?;
        tmp.write_all(&png).map_err(|e| format!("temp image write: {e}"))?;

        let output = self
            .command()
            .arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(lang_arg)
            .output()
            .map_err(|e| format!("cannot run '{}': {e}", self.cmd))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(chars = text.len(), langs = lang_arg, "Tesseract page done");
        Ok(text)
    }

    /// Base command with `TESSDATA_PREFIX` exported for the child only.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.cmd);
        if let Some(ref dir) = self.tessdata_dir {
            cmd.env("TESSDATA_PREFIX", dir);
        }
        cmd
    }
}
