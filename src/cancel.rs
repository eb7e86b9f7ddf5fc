//! Cooperative cancellation for in-flight analysis runs.
//!
//! A full run is nine sequential completion calls; abandoning the caller
//! without cancelling would still burn quota for every remaining section.
//! The token makes stopping an explicit, callable capability: hand a clone
//! to the UI's cancel button, keep one for the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable cancellation flag shared between a caller and a running
/// analysis.
///
/// Cancelling does not interrupt the completion call already in flight; it
/// stops the runner from issuing any further calls. The run then fails with
/// [`crate::error::RaincheckError::Cancelled`] and no partial result escapes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; safe to call from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
