//! Accurate backend: in-process neural OCR via `ocrs` + `rten`.
//!
//! Two model files are required in the configured model directory:
//! `text-detection.rten` locates text regions, `text-recognition.rten`
//! decodes the characters. Loading them is the expensive step — tens of
//! megabytes of weights — which is why [`crate::engine::OcrEngines`] keeps a
//! single loaded instance for the life of the process.
//!
//! Note: `ocrs`/`rten` must be compiled in release mode; debug builds are
//! 10-100x slower.

use crate::error::PipelineError;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use std::path::Path;
use tracing::{debug, info};

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// A loaded neural OCR engine. Reused across pages and requests.
pub struct NeuralBackend {
    engine: OcrEngine,
}

impl std::fmt::Debug for NeuralBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralBackend").finish_non_exhaustive()
    }
}

impl NeuralBackend {
    /// Load both models from `models_dir` and initialise the engine. Blocking
    /// and expensive; do it once.
    pub fn load(models_dir: &Path) -> Result<Self, PipelineError> {
        let unavailable = |hint: String| PipelineError::EngineUnavailable {
            engine: "accurate".to_string(),
            hint,
        };

        let detection_path = models_dir.join(DETECTION_MODEL);
        let recognition_path = models_dir.join(RECOGNITION_MODEL);
        for path in [&detection_path, &recognition_path] {
            if !path.exists() {
                return Err(unavailable(format!(
                    "Model file not found: {}\n\
                     Download the ocrs models (https://github.com/robertknight/ocrs-models/releases)\n\
                     into that directory, or point --models-dir / TEXTLIFT_MODELS_DIR elsewhere.",
                    path.display()
                )));
            }
        }

        info!(dir = %models_dir.display(), "Loading neural OCR models");
        let detection_model = Model::load_file(&detection_path).map_err(|e| {
            unavailable(format!(
                "Failed to load detection model {}: {e}",
                detection_path.display()
            ))
        })?;
        let recognition_model = Model::load_file(&recognition_path).map_err(|e| {
            unavailable(format!(
                "Failed to load recognition model {}: {e}",
                recognition_path.display()
            ))
        })?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| unavailable(format!("Failed to initialise neural engine: {e}")))?;

        info!("Neural OCR engine ready");
        Ok(Self { engine })
    }

    /// Extract all text from one page image. Blocking.
    ///
    /// Errors are detail strings for the caller's per-page
    /// [`crate::error::PageError`].
    pub fn recognize(&self, image: &DynamicImage) -> Result<String, String> {
        let rgb = image.to_rgb8();
        let dimensions = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), dimensions)
            .map_err(|e| format!("image source ({}x{}): {e}", dimensions.0, dimensions.1))?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| format!("preprocessing failed: {e}"))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|e| format!("recognition failed: {e}"))?;

        debug!(
            lines = text.lines().count(),
            chars = text.len(),
            "Neural page done"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_models_are_engine_unavailable_with_hint() {
        let err = NeuralBackend::load(Path::new("/nonexistent/textlift-models")).unwrap_err();
        assert_eq!(err.kind(), "engine_unavailable");
        let msg = err.to_string();
        assert!(msg.contains("text-detection.rten"), "got: {msg}");
        assert!(msg.contains("TEXTLIFT_MODELS_DIR"), "got: {msg}");
    }
}
