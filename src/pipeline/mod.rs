//! Pipeline stages for the OCR core.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ raster ──▶ engine ──▶ assemble ──▶ direction ──▶ export
//! (classify)  (pdfium)  (OCR/page)  (\f join)   (RTL scan)   (.txt + .docx)
//! ```
//!
//! 1. [`intake`]    — persist uploaded bytes to scratch storage and classify
//! 2. [`raster`]    — render document pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe (images skip this stage)
//! 3. [`crate::engine`] — per-page text extraction via the selected backend
//! 4. [`assemble`]  — join page texts with the form-feed boundary marker
//! 5. [`direction`] — decide right-to-left layout from the flattened text
//! 6. [`export`]    — serialize plain-text and DOCX artifacts atomically

pub mod assemble;
pub mod direction;
pub mod export;
pub mod intake;
pub mod raster;
