//! Configuration types for the OCR pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::engine::EngineChoice;
use crate::error::PipelineError;
use crate::progress::ProgressHook;
use std::fmt;
use std::path::PathBuf;

/// Configuration for one OCR processing request.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use textlift::{EngineChoice, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .dpi(300)
///     .engine(EngineChoice::Fast)
///     .languages(["en", "fa"])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Rendering DPI used when rasterising each document page. Range: 72–1200. Default: 300.
    ///
    /// 300 DPI is the classic OCR sweet spot: recogniser accuracy drops
    /// sharply below ~200 DPI, while going above 400 mostly buys larger
    /// buffers and slower inference. Pages are scaled by `dpi / 72` relative
    /// to their nominal point size.
    pub dpi: u32,

    /// Number of pages recognised concurrently. Range: 1–16. Default: 2.
    ///
    /// OCR is CPU-bound, not network-bound, so the useful ceiling is the
    /// number of physical cores divided by what the recogniser already uses
    /// internally. Two keeps a dual-page spread busy without starving the
    /// rest of the process; raise it on wide machines, lower it to 1 to be
    /// strictly sequential.
    pub concurrency: usize,

    /// Which OCR backend to run. Default: [`EngineChoice::Fast`].
    ///
    /// `Fast` shells out to tesseract and is tuned for printed, clean text.
    /// `Accurate` runs the in-process neural models and copes better with
    /// handwriting and irregular layouts, at a large one-time model-load
    /// cost (amortised across the life of the process).
    pub engine: EngineChoice,

    /// Default language hints, free-form codes in priority order. Default: `["en", "fa"]`.
    ///
    /// Used when a request supplies no hints of its own. Codes are normalised
    /// to each engine's own vocabulary at dispatch time ("en" becomes
    /// tesseract's "eng"); unknown codes pass through unchanged so new
    /// tesseract language packs work without a crate release.
    pub languages: Vec<String>,

    /// Path or name of the tesseract binary. Default: `"tesseract"`.
    ///
    /// Resolved through `PATH` when not absolute.
    pub tesseract_cmd: String,

    /// Directory containing tesseract's `*.traineddata` files.
    ///
    /// If `None` the binary's compiled-in default is used. When set, it is
    /// exported as `TESSDATA_PREFIX` for the child process only.
    pub tessdata_dir: Option<PathBuf>,

    /// Directory holding the neural models for the accurate engine. Default: `"models"`.
    ///
    /// Must contain `text-detection.rten` and `text-recognition.rten`. Only
    /// consulted when [`EngineChoice::Accurate`] is selected.
    pub models_dir: PathBuf,

    /// Maximum preview length in characters. Default: 4000.
    ///
    /// The preview handed back to the transport is the trimmed flattened text
    /// cut at this many characters, with a `"..."` marker appended when the
    /// cut actually dropped something.
    pub preview_limit: usize,

    /// Directory to publish export artifacts into. Default: `None`.
    ///
    /// `None` keeps artifacts in request-scoped scratch storage: they are
    /// returned to the caller as in-memory bytes and the files themselves are
    /// deleted with the request. Setting a directory additionally publishes
    /// `<stem>.txt` / `<stem>.docx` there.
    pub output_dir: Option<PathBuf>,

    /// Progress observer for transport-side status updates. Default: no-op.
    pub progress: Option<ProgressHook>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            concurrency: 2,
            engine: EngineChoice::Fast,
            languages: vec!["en".to_string(), "fa".to_string()],
            tesseract_cmd: "tesseract".to_string(),
            tessdata_dir: None,
            models_dir: PathBuf::from("models"),
            preview_limit: 4000,
            output_dir: None,
            progress: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("dpi", &self.dpi)
            .field("concurrency", &self.concurrency)
            .field("engine", &self.engine)
            .field("languages", &self.languages)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("tessdata_dir", &self.tessdata_dir)
            .field("models_dir", &self.models_dir)
            .field("preview_limit", &self.preview_limit)
            .field("output_dir", &self.output_dir)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn PipelineProgress>"))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 1200);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.clamp(1, 16);
        self
    }

    pub fn engine(mut self, engine: EngineChoice) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn languages<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.languages = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.tessdata_dir = Some(dir.into());
        self
    }

    pub fn models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.models_dir = dir.into();
        self
    }

    pub fn preview_limit(mut self, chars: usize) -> Self {
        self.config.preview_limit = chars.max(1);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn progress(mut self, hook: ProgressHook) -> Self {
        self.config.progress = Some(hook);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 1200 {
            return Err(PipelineError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(PipelineError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "tesseract_cmd must not be empty".into(),
            ));
        }
        if c.preview_limit == 0 {
            return Err(PipelineError::InvalidConfig(
                "Preview limit must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_service_contract() {
        let c = PipelineConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.languages, vec!["en", "fa"]);
        assert_eq!(c.preview_limit, 4000);
        assert_eq!(c.engine, EngineChoice::Fast);
        assert_eq!(c.tesseract_cmd, "tesseract");
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = PipelineConfig::builder()
            .dpi(10_000)
            .concurrency(99)
            .preview_limit(0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 1200);
        assert_eq!(c.concurrency, 16);
        assert_eq!(c.preview_limit, 1);
    }

    #[test]
    fn build_rejects_blank_tesseract_cmd() {
        let err = PipelineConfig::builder()
            .tesseract_cmd("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn languages_accepts_any_string_iterable() {
        let c = PipelineConfig::builder()
            .languages(vec![String::from("ar")])
            .build()
            .unwrap();
        assert_eq!(c.languages, vec!["ar"]);
        let c = PipelineConfig::builder().languages(["de", "en"]).build().unwrap();
        assert_eq!(c.languages, vec!["de", "en"]);
    }
}
