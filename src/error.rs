//! Error types for the textlift library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PipelineError`] — **Fatal**: the request cannot proceed at all
//!   (unsupported file type, unopenable document, engine missing, export
//!   destination unwritable). Returned as `Err(PipelineError)` from the
//!   top-level `process*` functions.
//!
//! * [`PageError`] — **Non-fatal**: text extraction failed for a single page
//!   but all other pages are fine. Stored inside
//!   [`crate::output::PageRecord`]; the pipeline substitutes an empty string
//!   for the failed page and keeps going, so one bad page degrades the
//!   output instead of losing the whole document.
//!
//! The separation is a hard contract: per-page extraction errors are absorbed
//! locally, every other error aborts the request and is surfaced to the
//! caller as a single human-readable message plus an abstract kind.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the textlift library.
///
/// Page-level extraction failures use [`PageError`] and are stored in
/// [`crate::output::PageRecord`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// The declared filename classifies to a kind the pipeline cannot OCR.
    #[error(
        "Unsupported file type: '{file_name}' (classified as {detected})\n\
         Supported inputs: images (png, jpg, jpeg, bmp, tiff, tif) and PDF documents."
    )]
    UnsupportedType { file_name: String, detected: String },

    /// The source document could not be opened or decoded at all.
    #[error("Cannot open source '{path}': {detail}")]
    SourceNotFound { path: PathBuf, detail: String },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// A page failed to rasterise; the whole document is abandoned rather
    /// than returning a silently truncated page sequence.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailure { page: u32, detail: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The selected OCR engine cannot run at all (binary not found, models
    /// missing or unloadable).
    #[error("OCR engine '{engine}' is unavailable.\n{hint}")]
    EngineUnavailable { engine: String, hint: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Could not create or publish an export artifact. Failed writes never
    /// leave a partial file at the destination path.
    #[error("Failed to write artifact '{path}': {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (worker task panic, poisoned state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Stable machine-readable tag for the transport layer.
    ///
    /// Transports show `to_string()` to humans and attach `kind()` to their
    /// own structured reply; neither ever contains a backtrace.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::SourceNotFound { .. } => "source_not_found",
            Self::RenderFailure { .. } => "render_failure",
            Self::EngineUnavailable { .. } => "engine_unavailable",
            Self::WriteFailure { .. } => "write_failure",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Internal(_) => "internal",
        }
    }
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageRecord`] when a page fails.
/// The affected page contributes an empty string to the assembled document;
/// page indices stay contiguous and the request still completes.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The recogniser returned an error for this page.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractFailure { page: u32, detail: String },
}

impl PageError {
    /// Page number (1-based) the failure belongs to.
    pub fn page(&self) -> u32 {
        match self {
            Self::ExtractFailure { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_display_names_the_file() {
        let e = PipelineError::UnsupportedType {
            file_name: "report.xlsx".into(),
            detected: "spreadsheet".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("report.xlsx"), "got: {msg}");
        assert!(msg.contains("spreadsheet"), "got: {msg}");
    }

    #[test]
    fn render_failure_display() {
        let e = PipelineError::RenderFailure {
            page: 3,
            detail: "bad content stream".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bad content stream"));
    }

    #[test]
    fn engine_unavailable_display_includes_hint() {
        let e = PipelineError::EngineUnavailable {
            engine: "fast".into(),
            hint: "Install tesseract or set --tesseract-cmd.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'fast'"), "got: {msg}");
        assert!(msg.contains("--tesseract-cmd"), "got: {msg}");
    }

    #[test]
    fn kinds_are_stable_tags() {
        let e = PipelineError::SourceNotFound {
            path: "in.pdf".into(),
            detail: "corrupt header".into(),
        };
        assert_eq!(e.kind(), "source_not_found");
        assert_eq!(
            PipelineError::Internal("boom".into()).kind(),
            "internal"
        );
    }

    #[test]
    fn page_error_roundtrips_through_serde() {
        let e = PageError::ExtractFailure {
            page: 2,
            detail: "recogniser exited with status 1".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: PageError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.page(), 2);
        assert!(back.to_string().contains("Page 2"));
    }
}
