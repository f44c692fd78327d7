//! Document rasterization: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread pool
//! so the transport front door stays responsive while a document renders.
//!
//! ## All pages or nothing
//!
//! A page that fails to render aborts the whole document. Partial page
//! sequences would silently truncate user data downstream — the assembled
//! text has no way to say "pages 4 through 9 are missing".

use crate::error::PipelineError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// One rendered page: a 1-based index plus its raster buffer.
///
/// Produced in source page order. Transient — consumed by the OCR engine
/// adapter and released.
pub struct PageImage {
    /// 1-based page number.
    pub number: u32,
    /// RGB8 raster, or RGBA8 when the page signals transparency.
    pub image: DynamicImage,
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("number", &self.number)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// Rasterize every page of a document at the given DPI.
///
/// Pages are scaled by `dpi / 72` relative to their nominal point size. The
/// output sequence has exactly one element per source page, in source order,
/// blank pages included.
///
/// # Errors
/// [`PipelineError::SourceNotFound`] when the document cannot be opened at
/// all; [`PipelineError::RenderFailure`] when any page fails to render (no
/// partial results are returned).
pub async fn rasterize_document(
    path: &Path,
    dpi: u32,
) -> Result<Vec<PageImage>, PipelineError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || rasterize_blocking(&path, dpi))
        .await
        .map_err(|e| PipelineError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of [`rasterize_document`].
fn rasterize_blocking(path: &Path, dpi: u32) -> Result<Vec<PageImage>, PipelineError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| PipelineError::SourceNotFound {
            path: path.to_path_buf(),
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("Document loaded: {} pages", total);

    let scale = dpi as f32 / 72.0;
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut results = Vec::with_capacity(total);

    for (index, page) in pages.iter().enumerate() {
        let number = index as u32 + 1;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            PipelineError::RenderFailure {
                page: number,
                detail: format!("{e:?}"),
            }
        })?;

        let rendered = bitmap.as_image();
        // pdfium hands back RGBA; keep the alpha channel only when the page
        // actually uses transparency.
        let image = if page.has_transparency() {
            rendered
        } else {
            DynamicImage::ImageRgb8(rendered.to_rgb8())
        };

        debug!(
            "Rendered page {}/{} → {}x{} px",
            number,
            total,
            image.width(),
            image.height()
        );

        results.push(PageImage { number, image });
    }

    Ok(results)
}

/// Page count of a document, without rendering anything.
pub async fn page_count(path: &Path) -> Result<usize, PipelineError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let pdfium = Pdfium::default();
        let document =
            pdfium
                .load_pdf_from_file(&path, None)
                .map_err(|e| PipelineError::SourceNotFound {
                    path: path.clone(),
                    detail: format!("{e:?}"),
                })?;
        Ok(document.pages().len() as usize)
    })
    .await
    .map_err(|e| PipelineError::Internal(format!("Page-count task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_image_debug_reports_dimensions() {
        let page = PageImage {
            number: 3,
            image: DynamicImage::new_rgb8(20, 10),
        };
        let dbg = format!("{page:?}");
        assert!(dbg.contains("number: 3"));
        assert!(dbg.contains("width: 20"));
    }

    // Rendering itself needs a pdfium library on the host; the N-page
    // count/order property lives in tests/pipeline.rs behind TEXTLIFT_E2E.
}
