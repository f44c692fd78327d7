//! Progress-callback trait for per-page pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgress>`] via
//! [`crate::config::PipelineConfigBuilder::progress`] to receive real-time
//! events while a file is processed. A chat transport can use this to keep
//! editing its "Processing your file…" status message; the CLI drives a
//! terminal progress bar with it.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a chat transport, a broadcast channel, or a progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` because pages may be recognised
//! concurrently.

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. When page concurrency is above 1, the per-page
/// methods may be called from different threads; implementations must guard
/// shared mutable state themselves.
pub trait PipelineProgress: Send + Sync {
    /// Called once after rasterization, before any page is recognised.
    fn on_pipeline_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the OCR backend.
    fn on_page_start(&self, page: usize, total: usize) {
        let _ = (page, total);
    }

    /// Called when a page's text was extracted successfully.
    ///
    /// `chars` is the length of the extracted text (possibly 0 for blank
    /// pages — still a success).
    fn on_page_done(&self, page: usize, total: usize, chars: usize) {
        let _ = (page, total, chars);
    }

    /// Called when a page's extraction failed and an empty string was
    /// substituted. The request continues.
    fn on_page_error(&self, page: usize, total: usize, error: &str) {
        let _ = (page, total, error);
    }

    /// Called once after the last page, before export.
    fn on_pipeline_finish(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl PipelineProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressHook = Arc<dyn PipelineProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingProgress {
        starts: AtomicUsize,
        done: AtomicUsize,
        errors: AtomicUsize,
        finished_with: AtomicUsize,
    }

    impl PipelineProgress for TrackingProgress {
        fn on_page_start(&self, _page: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_done(&self, _page: usize, _total: usize, _chars: usize) {
            self.done.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_pipeline_finish(&self, _total: usize, succeeded: usize) {
            self.finished_with.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_progress_does_not_panic() {
        let p = NoopProgress;
        p.on_pipeline_start(3);
        p.on_page_start(1, 3);
        p.on_page_done(1, 3, 42);
        p.on_page_error(2, 3, "some error");
        p.on_pipeline_finish(3, 2);
    }

    #[test]
    fn tracking_progress_receives_events() {
        let t = TrackingProgress {
            starts: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            finished_with: AtomicUsize::new(0),
        };

        t.on_pipeline_start(3);
        t.on_page_start(1, 3);
        t.on_page_done(1, 3, 100);
        t.on_page_start(2, 3);
        t.on_page_error(2, 3, "recogniser exited");
        t.on_page_start(3, 3);
        t.on_page_done(3, 3, 0);
        t.on_pipeline_finish(3, 2);

        assert_eq!(t.starts.load(Ordering::SeqCst), 3);
        assert_eq!(t.done.load(Ordering::SeqCst), 2);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.finished_with.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_hook_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProgressHook>();
        let hook: ProgressHook = Arc::new(NoopProgress);
        hook.on_pipeline_start(10);
    }
}
