//! Progress reporting for the startup loaders.
//!
//! Loading a full year of police.uk street data is a few million rows, so
//! the loaders report rows read through [`ProgressCallback`]. The rendering
//! backend (an `indicatif` bar in the CLI, nothing in tests) is chosen by
//! the caller.

use std::sync::Arc;

/// Receives progress updates from a loader.
pub trait ProgressCallback: Send + Sync {
    /// Advances progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
