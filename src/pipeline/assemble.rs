//! Text assembly: join per-page OCR output into one logical document.
//!
//! Pages are joined with a form-feed control character — a marker that never
//! occurs in normal OCR output, so consumers can split the flattened string
//! back into pages unambiguously. The assembler only ever receives resolved
//! text: the orchestrator substitutes an empty string for failed pages before
//! calling [`assemble`], so indices here are always contiguous.

/// The reserved page-boundary marker (form feed).
pub const PAGE_SEPARATOR: char = '\u{c}';

/// Page-ordered OCR text plus its flattened single-string view.
///
/// Invariant: `split_pages(doc.flatten())` reproduces the per-page texts in
/// their original order and count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pages: Vec<String>,
    flattened: String,
}

impl AssembledDocument {
    /// The flattened view: page texts joined with [`PAGE_SEPARATOR`].
    pub fn flatten(&self) -> &str {
        &self.flattened
    }

    /// Per-page texts in page order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Join page texts into an [`AssembledDocument`], preserving order.
///
/// A single-page input produces a flattened view with zero separators.
pub fn assemble(pages: Vec<String>) -> AssembledDocument {
    let flattened = pages.join(&PAGE_SEPARATOR.to_string());
    AssembledDocument { pages, flattened }
}

/// Split a flattened view back into per-page segments.
///
/// Text with no marker is one page — including the empty string.
pub fn split_pages(text: &str) -> Vec<&str> {
    text.split(PAGE_SEPARATOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(texts: &[&str]) -> AssembledDocument {
        assemble(texts.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn round_trip_law_holds() {
        // split(flatten(doc)) == original per-page texts, N ∈ {1, 2, 5}.
        for texts in [
            vec!["only page"],
            vec!["first", "second"],
            vec!["a", "b", "c", "d", "e"],
        ] {
            let d = doc(&texts);
            assert_eq!(split_pages(d.flatten()), texts);
            assert_eq!(d.page_count(), texts.len());
        }
    }

    #[test]
    fn single_page_has_no_separator() {
        let d = doc(&["hello\nworld"]);
        assert!(!d.flatten().contains(PAGE_SEPARATOR));
        assert_eq!(d.flatten(), "hello\nworld");
    }

    #[test]
    fn separator_count_is_pages_minus_one() {
        let d = doc(&["a", "b", "c"]);
        assert_eq!(
            d.flatten().matches(PAGE_SEPARATOR).count(),
            d.page_count() - 1
        );
    }

    #[test]
    fn empty_pages_survive_the_round_trip() {
        // A failed page contributes an empty string; it must still occupy
        // its slot after flatten/split.
        let d = doc(&["first", "", "third"]);
        assert_eq!(d.page_count(), 3);
        assert_eq!(split_pages(d.flatten()), vec!["first", "", "third"]);
    }

    #[test]
    fn flattened_text_without_marker_is_one_page() {
        assert_eq!(split_pages("no marker here"), vec!["no marker here"]);
        assert_eq!(split_pages(""), vec![""]);
    }
}
