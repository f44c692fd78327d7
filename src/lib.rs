//! # textlift
//!
//! Turn an uploaded document or image into text, a `.txt` artifact, and a
//! paginated `.docx` artifact — the OCR core of a conversational
//! document-to-text service.
//!
//! ## Why this crate?
//!
//! Chat bots and upload endpoints receive "a blob and a filename" and need
//! text back. textlift owns everything between those two points: it
//! classifies the upload, rasterizes PDF pages via pdfium, runs a
//! caller-selected OCR backend per page, reassembles the text in page order
//! with an explicit page marker, decides whether right-to-left layout rules
//! apply, and exports both artifacts plus a bounded preview. Transport,
//! session tracking, and user records stay with the caller.
//!
//! ## Pipeline Overview
//!
//! ```text
//! bytes + filename
//!  │
//!  ├─ 1. Intake     persist to request scratch storage, classify
//!  ├─ 2. Raster     PDF pages → images via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Extract    OCR per page: tesseract subprocess or neural models
//!  ├─ 4. Assemble   page texts joined with a form-feed marker
//!  ├─ 5. Direction  right-to-left detection (Arabic block scan)
//!  └─ 6. Export     .txt verbatim + paginated .docx, atomic publish
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textlift::{process_bytes, EngineChoice, OcrEngines, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .engine(EngineChoice::Fast)
//!         .languages(["en", "fa"])
//!         .build()?;
//!     // One handle for the life of the process; the accurate engine's
//!     // models load lazily on first use.
//!     let engines = OcrEngines::new(&config);
//!
//!     let bytes = std::fs::read("scan.pdf")?;
//!     let output = process_bytes(&bytes, "scan.pdf", &engines, &config).await?;
//!     println!("{}", output.preview);
//!     std::fs::write(&output.text_artifact.file_name, &output.text_artifact.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## The two engines
//!
//! | Engine | Backend | Best for | Cost |
//! |--------|---------|----------|------|
//! | [`EngineChoice::Fast`] | `tesseract` subprocess | printed, clean text | per-page subprocess |
//! | [`EngineChoice::Accurate`] | `ocrs` + `rten` in-process | handwriting, irregular layouts | one-time model load, then reused |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `textlift` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! textlift = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use engine::{EngineChoice, OcrEngines};
pub use error::{PageError, PipelineError};
pub use output::{ExportArtifact, PageRecord, PipelineOutput, PipelineStats, SourceProfile};
pub use pipeline::intake::SourceKind;
pub use process::{inspect_bytes, process_bytes, process_file};
pub use progress::{NoopProgress, PipelineProgress, ProgressHook};
