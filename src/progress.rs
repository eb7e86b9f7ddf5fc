//! Progress-callback trait for per-section analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! real-time events as the runner works through the catalog.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a progress bar, a WebSocket, or a busy-spinner in a UI —
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync`; when `concurrency > 1` the
//! section events may fire concurrently, so implementations must protect
//! shared mutable state.

use std::sync::Arc;

/// Called by the runner as it works through the catalog.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Section indices are 0-based catalog positions.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before any completion call is issued.
    fn on_analysis_start(&self, total_sections: usize) {
        let _ = total_sections;
    }

    /// Called just before a section's completion request is sent.
    fn on_section_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a section's answer has arrived.
    fn on_section_complete(&self, index: usize, total: usize, name: &str, body_len: usize) {
        let _ = (index, total, name, body_len);
    }

    /// Called when a section's completion call failed. The run aborts after
    /// this event — there are no retries.
    fn on_section_error(&self, index: usize, total: usize, name: &str, error: String) {
        let _ = (index, total, name, error);
    }

    /// Called once after the whole catalog completed successfully. Not called
    /// on failure or cancellation ([`on_section_error`](Self::on_section_error)
    /// already fired, or the run was cancelled).
    fn on_analysis_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
