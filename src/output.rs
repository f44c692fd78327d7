//! Report types handed back to the transport layer.
//!
//! Everything here is serialize-friendly: a chat bot forwards the preview and
//! artifacts to the user, a service wraps [`PipelineOutput`] in its own JSON
//! reply, and the CLI prints it with `--json`. Artifact bytes are kept out of
//! the serialized form — transports send those as file attachments, not as
//! inline JSON.

use crate::error::PageError;
use crate::pipeline::intake::SourceKind;
use serde::Serialize;

/// Extracted text for a single page, with timing and any absorbed failure.
///
/// Page numbers are 1-based and contiguous: a page whose extraction failed is
/// still present, carrying an empty `text` and its [`PageError`], so the
/// sequence always matches the rasterized page sequence exactly.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text. Empty when no glyphs were detected **or** when
    /// extraction failed (check `error` to tell the two apart).
    pub text: String,
    /// Wall-clock extraction time for this page.
    pub duration_ms: u64,
    /// The absorbed per-page failure, if any.
    pub error: Option<PageError>,
}

impl PageRecord {
    /// True when this page's extraction failed and an empty string was
    /// substituted for its text.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-stage timing and page accounting for one request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    /// Pages in the source document (1 for plain images).
    pub total_pages: usize,
    /// Pages whose text was extracted without error.
    pub processed_pages: usize,
    /// Pages that failed extraction and contributed an empty string.
    pub failed_pages: usize,
    /// Time spent rasterizing (or decoding the source image).
    pub raster_duration_ms: u64,
    /// Time spent inside the OCR backends, wall-clock across the page loop.
    pub ocr_duration_ms: u64,
    /// Time spent serializing and publishing both artifacts.
    pub export_duration_ms: u64,
    /// End-to-end request time.
    pub total_duration_ms: u64,
}

/// A named output blob produced by the export writers.
///
/// The backing file lives in request-scoped scratch storage and is deleted
/// when the request finishes; these bytes are the caller's only copy unless
/// an output directory was configured.
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    /// Suggested filename for the transport (`<stem>.txt` / `<stem>.docx`).
    pub file_name: String,
    /// The artifact content.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Size of the artifact in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the artifact is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Metadata-only description of an uploaded file, from
/// [`crate::process::inspect_bytes`].
#[derive(Debug, Clone, Serialize)]
pub struct SourceProfile {
    /// Declared filename the profile was computed for.
    pub file_name: String,
    /// Classified kind.
    pub kind: SourceKind,
    /// Page count: 1 for images, the document page count for PDFs, 0 for
    /// kinds the pipeline cannot OCR.
    pub pages: usize,
}

/// The complete result of one successful pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    /// Bounded preview of the flattened text (trimmed, cut at the configured
    /// limit, `"..."` appended when truncated).
    pub preview: String,
    /// Whether right-to-left layout rules were applied to the rich document.
    pub rtl: bool,
    /// Plain-text artifact (`<stem>.txt`), flattened text verbatim.
    pub text_artifact: ExportArtifact,
    /// Paginated rich-document artifact (`<stem>.docx`).
    pub docx_artifact: ExportArtifact,
    /// Per-page records in page order, including failed pages.
    pub pages: Vec<PageRecord>,
    /// Timing and accounting.
    pub stats: PipelineStats,
}

impl PipelineOutput {
    /// Number of pages that failed extraction (empty-text placeholders).
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.is_failed()).count()
    }
}
