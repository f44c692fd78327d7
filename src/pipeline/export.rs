//! Export writers: plain-text and paginated DOCX artifacts.
//!
//! Both writers publish atomically: content is written to a `.tmp` sibling
//! and renamed into place, so a failed write never leaves a partial file at
//! the destination path. Parent directories are created as needed.
//!
//! The DOCX writer recovers page boundaries by splitting the flattened text
//! on the page-separator marker, emits one paragraph per line within each
//! page, and an explicit page break between consecutive pages. When the
//! document was classified right-to-left, every text paragraph is
//! right-aligned — a proxy for RTL presentation, since the format's
//! paragraph-direction support is not exposed here.

use crate::error::PipelineError;
use crate::pipeline::assemble::{self, AssembledDocument};
use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Write the flattened text verbatim, page-separator markers included, as
/// UTF-8.
pub async fn write_plain_text(
    doc: &AssembledDocument,
    dest: &Path,
) -> Result<(), PipelineError> {
    publish_atomically(dest, doc.flatten().as_bytes()).await?;
    debug!(path = %dest.display(), bytes = doc.flatten().len(), "Plain-text artifact published");
    Ok(())
}

/// Write the paginated DOCX artifact.
///
/// Guarantees: paragraph count per page equals that page's newline-delimited
/// line count (empty lines become empty paragraphs); page count equals the
/// number of marker-delimited segments; exactly one page break between
/// consecutive pages and none after the last.
pub async fn write_rich_document(
    doc: &AssembledDocument,
    rtl: bool,
    dest: &Path,
) -> Result<(), PipelineError> {
    let bytes = build_docx(doc, rtl, dest)?;
    publish_atomically(dest, &bytes).await?;
    debug!(path = %dest.display(), bytes = bytes.len(), rtl, "DOCX artifact published");
    Ok(())
}

/// Serialize the document to DOCX bytes in memory.
fn build_docx(
    doc: &AssembledDocument,
    rtl: bool,
    dest: &Path,
) -> Result<Vec<u8>, PipelineError> {
    let pages = assemble::split_pages(doc.flatten());
    let last = pages.len() - 1;

    let mut docx = Docx::new();
    for (index, page) in pages.iter().enumerate() {
        for line in page.lines() {
            let mut paragraph = Paragraph::new().add_run(Run::new().add_text(line));
            if rtl {
                paragraph = paragraph.align(AlignmentType::Right);
            }
            docx = docx.add_paragraph(paragraph);
        }
        if index != last {
            docx = docx
                .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| PipelineError::WriteFailure {
            path: dest.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })?;

    Ok(buf.into_inner())
}

/// Write `bytes` to a fresh `.tmp` sibling of `dest`, then rename into place.
async fn publish_atomically(dest: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let fail = |source: std::io::Error| PipelineError::WriteFailure {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(fail)?;
        }
    }

    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await.map_err(fail)?;
    tokio::fs::rename(&tmp, dest).await.map_err(fail)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assemble::assemble;
    use std::io::Read;

    fn doc(texts: &[&str]) -> AssembledDocument {
        assemble(texts.iter().map(|t| t.to_string()).collect())
    }

    /// Pull `word/document.xml` out of a packed DOCX.
    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        let mut file = archive
            .by_name("word/document.xml")
            .expect("document.xml present");
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        xml
    }

    fn paragraph_count(xml: &str) -> usize {
        xml.matches("</w:p>").count()
    }

    fn page_break_count(xml: &str) -> usize {
        xml.matches("w:type=\"page\"").count()
    }

    fn right_aligned_count(xml: &str) -> usize {
        xml.matches("w:val=\"right\"").count()
    }

    #[test]
    fn two_page_document_layout() {
        // Page 1: "line1\nline2" → 2 paragraphs; page 2: "line3" → 1.
        // One break paragraph between them, none after the last.
        let d = doc(&["line1\nline2", "line3"]);
        let bytes = build_docx(&d, false, Path::new("out.docx")).unwrap();
        let xml = document_xml(&bytes);

        assert_eq!(page_break_count(&xml), 1);
        assert_eq!(paragraph_count(&xml), 4); // 2 + 1 text + 1 break paragraph
        assert_eq!(right_aligned_count(&xml), 0);
        assert!(xml.contains("line1"));
        assert!(xml.contains("line3"));
    }

    #[test]
    fn rtl_right_aligns_every_text_paragraph() {
        let d = doc(&["line1\nline2", "line3"]);
        let bytes = build_docx(&d, true, Path::new("out.docx")).unwrap();
        let xml = document_xml(&bytes);

        // The page-break paragraph carries no alignment.
        assert_eq!(right_aligned_count(&xml), 3);
        assert_eq!(page_break_count(&xml), 1);
    }

    #[test]
    fn single_page_has_no_break() {
        let d = doc(&["just one page"]);
        let bytes = build_docx(&d, false, Path::new("out.docx")).unwrap();
        let xml = document_xml(&bytes);

        assert_eq!(page_break_count(&xml), 0);
        assert_eq!(paragraph_count(&xml), 1);
    }

    #[test]
    fn empty_lines_become_empty_paragraphs() {
        let d = doc(&["above\n\nbelow"]);
        let bytes = build_docx(&d, false, Path::new("out.docx")).unwrap();
        let xml = document_xml(&bytes);

        assert_eq!(paragraph_count(&xml), 3);
    }

    #[tokio::test]
    async fn plain_text_is_written_verbatim_with_markers() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        let d = doc(&["page one", "page two"]);

        write_plain_text(&d, &dest).await.unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(written, "page one\u{c}page two");
        // No staging file left behind.
        assert!(!dir.path().join("out.txt.tmp").exists());
    }

    #[tokio::test]
    async fn writers_create_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/deeper/out.txt");
        let d = doc(&["content"]);

        write_plain_text(&d, &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "content");
    }

    #[tokio::test]
    async fn docx_artifact_is_a_valid_archive() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.docx");
        let d = doc(&["hello"]);

        write_rich_document(&d, false, &dest).await.unwrap();

        let bytes = std::fs::read(&dest).unwrap();
        let xml = document_xml(&bytes);
        assert!(xml.contains("hello"));
        assert!(!dir.path().join("out.docx.tmp").exists());
    }

    #[tokio::test]
    async fn unwritable_destination_fails_without_partial_file() {
        let d = doc(&["content"]);
        let dest = Path::new("/proc/textlift-definitely-not-writable/out.txt");
        let err = write_plain_text(&d, dest).await.unwrap_err();
        assert_eq!(err.kind(), "write_failure");
    }
}
