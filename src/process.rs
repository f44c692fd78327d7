//! The pipeline orchestrator: file-intake → OCR-dispatch → export.
//!
//! One request moves through the stages
//! `Received → Classified → Rasterized → Extracting → Assembled → Exported →
//! Done`, with any fatal error short-circuiting the whole run. Request state
//! is scoped to this call: the scratch directory created at intake owns the
//! saved upload and the intermediate artifact files, and its RAII guard drops
//! on every exit path — success, error, or panic — so nothing of the request
//! survives past the pipeline boundary.
//!
//! ## Failed-page policy
//!
//! A page whose extraction fails does **not** abort the request: it is
//! logged, recorded on its [`PageRecord`], and contributes an empty string so
//! page indices stay contiguous. Consumers rely on this: degraded output
//! beats a lost document.
//! Everything else — unsupported type, unopenable source, render
//! failure, engine unavailable, export failure — is fatal.

use crate::config::PipelineConfig;
use crate::engine::OcrEngines;
use crate::error::PipelineError;
use crate::output::{ExportArtifact, PageRecord, PipelineOutput, PipelineStats, SourceProfile};
use crate::pipeline::{assemble, direction, export, intake, raster};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process raw uploaded bytes through the full pipeline.
///
/// This is the primary entry point for the library. `engines` is the shared
/// backend handle created once at startup; `config` carries the per-request
/// knobs (engine choice, language hints, DPI, preview limit).
///
/// # Errors
/// Fatal [`PipelineError`]s only — per-page extraction failures are absorbed
/// (check `output.pages[..].error` / `output.stats.failed_pages`).
pub async fn process_bytes(
    bytes: &[u8],
    file_name: &str,
    engines: &OcrEngines,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let total_start = Instant::now();
    info!(file_name, engine = %config.engine, "Starting OCR request");

    // ── Received → Classified ────────────────────────────────────────────
    let source = intake::store_bytes(bytes, file_name)?;
    let kind = source.kind();
    if !kind.is_supported() {
        return Err(PipelineError::UnsupportedType {
            file_name: file_name.to_string(),
            detected: kind.as_str().to_string(),
        });
    }
    debug!(kind = %kind, "Input classified");

    // ── Classified → Rasterized ──────────────────────────────────────────
    let raster_start = Instant::now();
    let pages = match kind {
        intake::SourceKind::Document => {
            raster::rasterize_document(source.path(), config.dpi).await?
        }
        // Already a raster: wrap as a single-element page sequence.
        _ => vec![decode_image(source.path()).await?],
    };
    let raster_duration_ms = raster_start.elapsed().as_millis() as u64;
    let total_pages = pages.len();
    info!(pages = total_pages, ms = raster_duration_ms, "Pages ready");

    // ── Rasterized → Extracting ──────────────────────────────────────────
    // Availability is resolved once up front so a dead backend is one fatal
    // error, not N per-page ones.
    engines
        .ensure_available(config.engine, &config.languages)
        .await?;

    if let Some(ref cb) = config.progress {
        cb.on_pipeline_start(total_pages);
    }

    let ocr_start = Instant::now();
    let mut records: Vec<PageRecord> = stream::iter(pages.into_iter().map(|page| {
        let number = page.number;
        async move {
            if let Some(ref cb) = config.progress {
                cb.on_page_start(number as usize, total_pages);
            }
            let page_start = Instant::now();
            let outcome = engines.extract(config.engine, page, &config.languages).await;
            let duration_ms = page_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) => {
                    if let Some(ref cb) = config.progress {
                        cb.on_page_done(number as usize, total_pages, text.len());
                    }
                    PageRecord {
                        number,
                        text,
                        duration_ms,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(page = number, %err, "Page extraction failed; substituting empty text");
                    if let Some(ref cb) = config.progress {
                        cb.on_page_error(number as usize, total_pages, &err.to_string());
                    }
                    PageRecord {
                        number,
                        text: String::new(),
                        duration_ms,
                        error: Some(err),
                    }
                }
            }
        }
    }))
    .buffered(config.concurrency)
    .collect()
    .await;

    // Pages may finish out of order under concurrency; the assembler's
    // contract is index order.
    records.sort_by_key(|r| r.number);
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    let failed_pages = records.iter().filter(|r| r.is_failed()).count();
    if let Some(ref cb) = config.progress {
        cb.on_pipeline_finish(total_pages, total_pages - failed_pages);
    }

    // ── Extracting → Assembled ───────────────────────────────────────────
    let document = assemble::assemble(records.iter().map(|r| r.text.clone()).collect());

    // ── Assembled → Exported ─────────────────────────────────────────────
    let rtl = direction::is_right_to_left(document.flatten());
    let export_start = Instant::now();

    let export_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| source.scratch_dir().to_path_buf());
    let txt_name = format!("{}.txt", source.stem());
    let docx_name = format!("{}.docx", source.stem());
    let txt_path = export_dir.join(&txt_name);
    let docx_path = export_dir.join(&docx_name);

    export::write_plain_text(&document, &txt_path).await?;
    export::write_rich_document(&document, rtl, &docx_path).await?;

    let text_artifact = read_artifact(&txt_path, txt_name).await?;
    let docx_artifact = read_artifact(&docx_path, docx_name).await?;
    let export_duration_ms = export_start.elapsed().as_millis() as u64;

    // ── Exported → Done ──────────────────────────────────────────────────
    let preview = bounded_preview(document.flatten(), config.preview_limit);

    let stats = PipelineStats {
        total_pages,
        processed_pages: total_pages - failed_pages,
        failed_pages,
        raster_duration_ms,
        ocr_duration_ms,
        export_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        pages = total_pages,
        failed = failed_pages,
        rtl,
        ms = stats.total_duration_ms,
        "Request done"
    );

    // `source` drops here: scratch directory, saved upload and intermediate
    // artifact files are all released.
    Ok(PipelineOutput {
        preview,
        rtl,
        text_artifact,
        docx_artifact,
        pages: records,
        stats,
    })
}

/// Read a file from disk through the full pipeline.
///
/// Convenience wrapper for callers that have a path rather than bytes.
pub async fn process_file(
    path: impl AsRef<Path>,
    engines: &OcrEngines,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::SourceNotFound {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    process_bytes(&bytes, &file_name, engines, config).await
}

/// Classify uploaded bytes and count pages, without running any OCR.
///
/// For transports that acknowledge uploads ("received your 3-page
/// document…"). Kinds the pipeline cannot OCR report zero pages rather than
/// failing, since no processing was requested.
pub async fn inspect_bytes(
    bytes: &[u8],
    file_name: &str,
) -> Result<SourceProfile, PipelineError> {
    let source = intake::store_bytes(bytes, file_name)?;
    let pages = match source.kind() {
        intake::SourceKind::Document => raster::page_count(source.path()).await?,
        intake::SourceKind::Image => 1,
        _ => 0,
    };
    Ok(SourceProfile {
        file_name: file_name.to_string(),
        kind: source.kind(),
        pages,
    })
}

/// Decode an already-raster source as the single page of its sequence.
async fn decode_image(path: &Path) -> Result<raster::PageImage, PipelineError> {
    let owned = path.to_path_buf();
    let image = tokio::task::spawn_blocking(move || image::open(&owned))
        .await
        .map_err(|e| PipelineError::Internal(format!("Decode task panicked: {e}")))?
        .map_err(|e| PipelineError::SourceNotFound {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    Ok(raster::PageImage { number: 1, image })
}

/// First `limit` characters of the trimmed text, with a truncation marker
/// appended only when the cut actually dropped something.
fn bounded_preview(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Read a published artifact back into memory.
async fn read_artifact(path: &Path, file_name: String) -> Result<ExportArtifact, PipelineError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::WriteFailure {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(ExportArtifact { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_of_long_text_is_cut_with_marker() {
        let text = "a".repeat(5000);
        let preview = bounded_preview(&text, 4000);
        assert_eq!(preview.chars().count(), 4003);
        assert!(preview.ends_with("..."));
        assert_eq!(&preview[..4000], &text[..4000]);
    }

    #[test]
    fn preview_of_short_text_is_verbatim() {
        let text = "b".repeat(100);
        assert_eq!(bounded_preview(&text, 4000), text);
    }

    #[test]
    fn preview_at_exact_limit_has_no_marker() {
        let text = "c".repeat(4000);
        assert_eq!(bounded_preview(&text, 4000), text);
    }

    #[test]
    fn preview_trims_before_cutting() {
        assert_eq!(bounded_preview("  hello  \n", 4000), "hello");
        let padded = format!("\n\n{}\n", "d".repeat(4001));
        let preview = bounded_preview(&padded, 4000);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 4003);
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(bounded_preview(&text, 5), format!("{}...", "é".repeat(5)));
    }

    #[test]
    fn preview_of_empty_text_is_empty() {
        assert_eq!(bounded_preview("", 4000), "");
        assert_eq!(bounded_preview("   ", 4000), "");
    }
}
