//! File intake: persist uploaded bytes into request-scoped scratch storage
//! and classify them.
//!
//! ## Why write to a temp directory?
//!
//! pdfium and the tesseract binary both require a file-system path — neither
//! can stream from a byte buffer. Persisting the upload into a per-request
//! `TempDir` gives every downstream stage a path to work with while ensuring
//! cleanup happens automatically when [`SourceFile`] is dropped, on success,
//! failure, or panic. Export artifacts default to the same directory, so one
//! drop releases everything the request touched.

use crate::error::PipelineError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Extensions classified as plain raster images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

/// Extensions classified as spreadsheets (recognised but not OCR-able).
const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx"];

/// What kind of file an upload was classified as.
///
/// Classification happens once at intake, from the declared filename, and is
/// immutable for the rest of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Single raster image — bypasses rasterization entirely.
    Image,
    /// Multi-page paginated document (PDF).
    Document,
    /// Spreadsheet — recognised so the error can name it, but there is no
    /// OCR path for spreadsheets.
    Spreadsheet,
    /// Anything else.
    Unknown,
}

impl SourceKind {
    /// Human-readable tag used in error messages and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheet",
            Self::Unknown => "unknown",
        }
    }

    /// True for kinds the pipeline can actually OCR.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Image | Self::Document)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded file persisted into request-scoped scratch storage.
///
/// Owns the scratch `TempDir`: dropping the `SourceFile` deletes the saved
/// bytes and any intermediate artifacts written next to them.
pub struct SourceFile {
    path: PathBuf,
    file_name: String,
    stem: String,
    kind: SourceKind,
    scratch: TempDir,
}

impl SourceFile {
    /// Path of the persisted upload inside the scratch directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The declared filename, as received from the transport.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Sanitised filename stem used to name export artifacts.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Classified kind.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// The request's scratch directory. Default destination for export
    /// artifacts; everything inside is deleted when `self` drops.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("file_name", &self.file_name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Classify a declared filename by extension, case-insensitive.
pub fn classify(file_name: &str) -> SourceKind {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        SourceKind::Image
    } else if ext == "pdf" {
        SourceKind::Document
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        SourceKind::Spreadsheet
    } else {
        SourceKind::Unknown
    }
}

/// Persist uploaded bytes into a fresh scratch directory and classify them.
///
/// A file claiming to be a PDF whose content does not start with `%PDF` is
/// rejected here, before pdfium ever sees it, so the caller gets a meaningful
/// error instead of an opaque parser failure.
pub fn store_bytes(bytes: &[u8], file_name: &str) -> Result<SourceFile, PipelineError> {
    let kind = classify(file_name);

    if kind == SourceKind::Document && !bytes.starts_with(b"%PDF") {
        return Err(PipelineError::UnsupportedType {
            file_name: file_name.to_string(),
            detected: "document without a PDF header".to_string(),
        });
    }

    let scratch = tempfile::Builder::new()
        .prefix("textlift-")
        .tempdir()
        .map_err(|e| PipelineError::Internal(format!("scratch dir: {e}")))?;

    let stem = sanitize_stem(file_name);
    let saved_name = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{}", ext.to_ascii_lowercase()),
        None => stem.clone(),
    };
    let path = scratch.path().join(&saved_name);

    std::fs::write(&path, bytes).map_err(|e| PipelineError::Internal(format!("save upload: {e}")))?;

    debug!(
        path = %path.display(),
        kind = %kind,
        size = bytes.len(),
        "Upload persisted to scratch storage"
    );

    Ok(SourceFile {
        path,
        file_name: file_name.to_string(),
        stem,
        kind,
        scratch,
    })
}

/// Reduce a declared filename to a safe artifact-name stem.
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
/// Declared filenames come straight from the transport and may contain path
/// separators or control characters.
fn sanitize_stem(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases = [
            ("scan.png", SourceKind::Image),
            ("photo.JPG", SourceKind::Image),
            ("fax.jpeg", SourceKind::Image),
            ("old.bmp", SourceKind::Image),
            ("page.tiff", SourceKind::Image),
            ("page.tif", SourceKind::Image),
            ("report.pdf", SourceKind::Document),
            ("REPORT.PDF", SourceKind::Document),
            ("budget.xls", SourceKind::Spreadsheet),
            ("budget.xlsx", SourceKind::Spreadsheet),
            ("notes.txt", SourceKind::Unknown),
            ("archive.zip", SourceKind::Unknown),
            ("no_extension", SourceKind::Unknown),
            ("", SourceKind::Unknown),
        ];
        for (name, expected) in cases {
            assert_eq!(classify(name), expected, "for {name:?}");
        }
    }

    #[test]
    fn supported_kinds() {
        assert!(SourceKind::Image.is_supported());
        assert!(SourceKind::Document.is_supported());
        assert!(!SourceKind::Spreadsheet.is_supported());
        assert!(!SourceKind::Unknown.is_supported());
    }

    #[test]
    fn store_persists_bytes_in_scratch() {
        let src = store_bytes(b"hello", "scan.png").unwrap();
        assert_eq!(src.kind(), SourceKind::Image);
        assert_eq!(src.stem(), "scan");
        assert_eq!(std::fs::read(src.path()).unwrap(), b"hello");
        assert!(src.path().starts_with(src.scratch_dir()));
    }

    #[test]
    fn scratch_is_deleted_on_drop() {
        let src = store_bytes(b"hello", "scan.png").unwrap();
        let dir = src.scratch_dir().to_path_buf();
        assert!(dir.exists());
        drop(src);
        assert!(!dir.exists());
    }

    #[test]
    fn declared_pdf_without_magic_is_rejected() {
        let err = store_bytes(b"not a pdf at all", "report.pdf").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedType { .. }));
        assert_eq!(err.kind(), "unsupported_type");
    }

    #[test]
    fn declared_pdf_with_magic_is_accepted() {
        let src = store_bytes(b"%PDF-1.7 rest", "report.pdf").unwrap();
        assert_eq!(src.kind(), SourceKind::Document);
    }

    #[test]
    fn stems_are_sanitised() {
        assert_eq!(sanitize_stem("scan.pdf"), "scan");
        assert_eq!(sanitize_stem("my scan (1).pdf"), "my_scan__1_");
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_stem(""), "upload");
        assert_eq!(sanitize_stem("???"), "upload");
        assert_eq!(sanitize_stem("no_extension"), "no_extension");
    }
}
