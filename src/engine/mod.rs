//! OCR engine adapter: two interchangeable backends behind one call.
//!
//! The backends are a closed pair, selected explicitly by the caller — the
//! adapter never auto-detects between them:
//!
//! * [`EngineChoice::Fast`] — shells out to a `tesseract` binary. Quick, and
//!   tuned for printed, clean text.
//! * [`EngineChoice::Accurate`] — in-process neural models (`ocrs` + `rten`).
//!   Slower, copes better with handwriting and irregular layouts, and pays a
//!   large one-time model-load cost.
//!
//! [`OcrEngines`] is the owned handle holding both: created once at startup
//! and passed by reference into every request. The accurate backend loads
//! lazily behind a `tokio::sync::OnceCell` — the first caller initialises it,
//! concurrent callers await the same instance, and the instance is reused for
//! the life of the process. This is the only cross-request shared state in
//! the library.

mod neural;
mod tesseract;

pub use neural::NeuralBackend;
pub use tesseract::TesseractBackend;

use crate::config::PipelineConfig;
use crate::error::{PageError, PipelineError};
use crate::pipeline::raster::PageImage;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Which OCR backend a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineChoice {
    /// Tesseract subprocess — fast, printed text.
    Fast,
    /// In-process neural models — slower, handwriting and irregular layouts.
    Accurate,
}

impl EngineChoice {
    /// Tag used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Accurate => "accurate",
        }
    }
}

impl std::fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic code → tesseract traineddata name.
static FAST_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("en", "eng"),
        ("fa", "fas"),
        ("ar", "ara"),
        ("de", "deu"),
        ("ru", "rus"),
        ("es", "spa"),
        ("pt", "por"),
        ("zh", "chi_sim"),
        ("zh-cn", "chi_sim"),
        ("zh-tw", "chi_tra"),
    ])
});

/// Generic or tesseract-style code → the neural backend's short locale code.
static ACCURATE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("eng", "en"),
        ("fas", "fa"),
        ("per", "fa"),
        ("ara", "ar"),
        ("deu", "de"),
        ("rus", "ru"),
        ("spa", "es"),
        ("por", "pt"),
        ("chi_sim", "ch_sim"),
        ("zh", "ch_sim"),
        ("zh-cn", "ch_sim"),
        ("chi_tra", "ch_tra"),
        ("zh-tw", "ch_tra"),
    ])
});

/// Normalize free-form language hints into one engine's code vocabulary.
///
/// Codes are trimmed, lowercased and looked up in the vocabulary table;
/// unknown codes pass through unchanged so new language packs work without a
/// crate release. Duplicates after mapping are removed with first-occurrence
/// order preserved, keeping language priority deterministic.
fn normalize(hints: &[String], vocab: &HashMap<&'static str, &'static str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(hints.len());
    for hint in hints {
        let key = hint.trim().to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }
        let mapped = vocab.get(key.as_str()).map_or(key, |m| (*m).to_string());
        if !out.contains(&mapped) {
            out.push(mapped);
        }
    }
    out
}

/// Hints normalized to tesseract traineddata names.
pub fn fast_language_codes(hints: &[String]) -> Vec<String> {
    normalize(hints, &FAST_CODES)
}

/// Hints normalized to the neural backend's locale codes.
pub fn accurate_language_codes(hints: &[String]) -> Vec<String> {
    normalize(hints, &ACCURATE_CODES)
}

/// The `-l` argument for tesseract, e.g. `"eng+fas"`. Falls back to `"eng"`
/// when no usable hint survives normalization.
fn tesseract_lang_arg(hints: &[String]) -> String {
    let codes = fast_language_codes(hints);
    if codes.is_empty() {
        "eng".to_string()
    } else {
        codes.join("+")
    }
}

/// Owned handle over both OCR backends.
///
/// Create one at startup with [`OcrEngines::new`] and pass it by reference
/// into every request. Cheap to construct — the expensive accurate-engine
/// initialization is deferred to the first accurate request.
pub struct OcrEngines {
    tesseract: TesseractBackend,
    models_dir: PathBuf,
    neural: OnceCell<Arc<NeuralBackend>>,
}

impl OcrEngines {
    /// Build the handle from the engine-resource fields of `config`.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            tesseract: TesseractBackend::new(
                &config.tesseract_cmd,
                config.tessdata_dir.clone(),
            ),
            models_dir: config.models_dir.clone(),
            neural: OnceCell::new(),
        }
    }

    /// Resolve availability of the selected backend, once per request, before
    /// the page loop. A backend that cannot run at all is a fatal
    /// [`PipelineError::EngineUnavailable`]; after this succeeds, any error
    /// inside the page loop is per-page.
    pub async fn ensure_available(
        &self,
        choice: EngineChoice,
        hints: &[String],
    ) -> Result<(), PipelineError> {
        match choice {
            EngineChoice::Fast => {
                let backend = self.tesseract.clone();
                tokio::task::spawn_blocking(move || backend.probe())
                    .await
                    .map_err(|e| PipelineError::Internal(format!("Probe task panicked: {e}")))??;
                debug!(langs = %tesseract_lang_arg(hints), "Fast engine available");
                Ok(())
            }
            EngineChoice::Accurate => {
                self.accurate_backend(hints).await.map(|_| ())
            }
        }
    }

    /// Extract text from one page image with the selected backend.
    ///
    /// Consumes the page — the raster buffer is released as soon as the
    /// backend is done with it. An empty string is a valid success (no glyphs
    /// detected); errors here are per-page and never abort the request.
    pub async fn extract(
        &self,
        choice: EngineChoice,
        page: PageImage,
        hints: &[String],
    ) -> Result<String, PageError> {
        let number = page.number;
        let extract_failure = move |detail: String| PageError::ExtractFailure {
            page: number,
            detail,
        };

        match choice {
            EngineChoice::Fast => {
                let backend = self.tesseract.clone();
                let lang_arg = tesseract_lang_arg(hints);
                tokio::task::spawn_blocking(move || backend.recognize(&page.image, &lang_arg))
                    .await
                    .map_err(|e| extract_failure(format!("worker panicked: {e}")))?
                    .map_err(extract_failure)
            }
            EngineChoice::Accurate => {
                // Availability was resolved before the page loop; a failure
                // here still only costs this page.
                let backend = self
                    .accurate_backend(hints)
                    .await
                    .map_err(|e| extract_failure(e.to_string()))?;
                tokio::task::spawn_blocking(move || backend.recognize(&page.image))
                    .await
                    .map_err(|e| extract_failure(format!("worker panicked: {e}")))?
                    .map_err(extract_failure)
            }
        }
    }

    /// The lazily-initialized accurate backend. First caller loads the
    /// models; concurrent callers await the same load and share the instance.
    async fn accurate_backend(
        &self,
        hints: &[String],
    ) -> Result<Arc<NeuralBackend>, PipelineError> {
        self.neural
            .get_or_try_init(|| async {
                let dir = self.models_dir.clone();
                let langs = accurate_language_codes(hints);
                info!(
                    models_dir = %dir.display(),
                    langs = langs.join(","),
                    "Initialising accurate OCR engine (one-time model load)"
                );
                // The bundled recognition model is language-agnostic; the
                // normalized hint order is recorded for priority and logging.
                if langs.is_empty() {
                    warn!("No usable language hints for the accurate engine; defaulting to en");
                }
                let backend = tokio::task::spawn_blocking(move || NeuralBackend::load(&dir))
                    .await
                    .map_err(|e| {
                        PipelineError::Internal(format!("Model-load task panicked: {e}"))
                    })??;
                Ok(Arc::new(backend))
            })
            .await
            .cloned()
    }
}

impl std::fmt::Debug for OcrEngines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngines")
            .field("tesseract", &self.tesseract)
            .field("models_dir", &self.models_dir)
            .field("neural_loaded", &self.neural.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn fast_codes_map_to_traineddata_names() {
        assert_eq!(fast_language_codes(&hints(&["en", "fa"])), vec!["eng", "fas"]);
        assert_eq!(fast_language_codes(&hints(&["zh-cn"])), vec!["chi_sim"]);
        assert_eq!(fast_language_codes(&hints(&["zh-tw"])), vec!["chi_tra"]);
    }

    #[test]
    fn accurate_codes_map_to_locale_codes() {
        assert_eq!(
            accurate_language_codes(&hints(&["eng", "fas"])),
            vec!["en", "fa"]
        );
        assert_eq!(accurate_language_codes(&hints(&["per"])), vec!["fa"]);
        assert_eq!(accurate_language_codes(&hints(&["zh"])), vec!["ch_sim"]);
    }

    #[test]
    fn unknown_codes_pass_through_unchanged() {
        assert_eq!(
            fast_language_codes(&hints(&["en", "tlh"])),
            vec!["eng", "tlh"]
        );
        assert_eq!(accurate_language_codes(&hints(&["xx"])), vec!["xx"]);
    }

    #[test]
    fn duplicates_after_mapping_are_removed_order_preserved() {
        // "en" and "eng" both map to "eng"; first occurrence wins.
        assert_eq!(
            fast_language_codes(&hints(&["en", "eng", "fa", "en"])),
            vec!["eng", "fas"]
        );
        // "zh" and "zh-cn" collapse on the fast side.
        assert_eq!(
            fast_language_codes(&hints(&["zh", "zh-cn", "ar"])),
            vec!["chi_sim", "ara"]
        );
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(
            fast_language_codes(&hints(&[" EN ", "Fa"])),
            vec!["eng", "fas"]
        );
    }

    #[test]
    fn lang_arg_joins_with_plus_and_defaults_to_eng() {
        assert_eq!(tesseract_lang_arg(&hints(&["en", "fa"])), "eng+fas");
        assert_eq!(tesseract_lang_arg(&hints(&["en"])), "eng");
        assert_eq!(tesseract_lang_arg(&[]), "eng");
        assert_eq!(tesseract_lang_arg(&hints(&["  ", ""])), "eng");
    }

    #[test]
    fn engine_choice_tags() {
        assert_eq!(EngineChoice::Fast.as_str(), "fast");
        assert_eq!(EngineChoice::Accurate.to_string(), "accurate");
        let json = serde_json::to_string(&EngineChoice::Accurate).unwrap();
        assert_eq!(json, "\"accurate\"");
    }

    #[test]
    fn engines_handle_is_cheap_to_build() {
        let config = PipelineConfig::default();
        let engines = OcrEngines::new(&config);
        let dbg = format!("{engines:?}");
        assert!(dbg.contains("neural_loaded: false"));
    }
}
