//! Scan session state: status, progress, and advisory cancellation.
//!
//! A [`ScanSlot`] guards one scan type (discovery or signal) so at most one
//! run of that type is in flight at a time. The handle it produces carries a
//! [`CancellationToken`] that the controllers poll at loop boundaries:
//! between queries, between subreddits, and between comment listings. An
//! in-flight HTTP call is never interrupted, so the worst-case latency after
//! a cancel request is one already-started call plus its comment sub-loop.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::types::ScanStatus;

/// Shared progress indicator: fraction in `[0, 1]` plus a human-readable label.
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    inner: Arc<Mutex<(f32, String)>>,
}

impl ScanProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the progress fraction (clamped to `[0, 1]`) and label.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set(&self, fraction: f32, label: impl Into<String>) {
        let mut guard = self.inner.lock().expect("progress lock poisoned");
        *guard = (fraction.clamp(0.0, 1.0), label.into());
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> (f32, String) {
        self.inner.lock().expect("progress lock poisoned").clone()
    }
}

/// Live handle to one scan run.
#[derive(Debug, Clone)]
pub struct ScanHandle {
    status: Arc<Mutex<ScanStatus>>,
    progress: ScanProgress,
    cancel: CancellationToken,
}

impl ScanHandle {
    fn new() -> Self {
        Self {
            status: Arc::new(Mutex::new(ScanStatus::Running)),
            progress: ScanProgress::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn status(&self) -> ScanStatus {
        *self.status.lock().expect("status lock poisoned")
    }

    #[must_use]
    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Requests cancellation. Advisory and only effective while Running;
    /// requests against a finished run are ignored.
    pub fn request_cancel(&self) {
        if self.status() == ScanStatus::Running {
            self.cancel.cancel();
        }
    }

    fn set_status(&self, status: ScanStatus) {
        *self.status.lock().expect("status lock poisoned") = status;
    }
}

/// Returned when a scan of the same type is already Running.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("a scan of this type is already running")]
pub struct ScanSlotBusy;

/// Guards one scan type so at most one run is Running at a time.
#[derive(Debug, Clone, Default)]
pub struct ScanSlot {
    current: Arc<Mutex<Option<ScanHandle>>>,
}

impl ScanSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot and returns a fresh Running handle.
    ///
    /// # Errors
    ///
    /// Returns [`ScanSlotBusy`] if a run is already Running.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn begin(&self) -> Result<ScanHandle, ScanSlotBusy> {
        let mut current = self.current.lock().expect("slot lock poisoned");
        if let Some(handle) = current.as_ref() {
            if handle.status() == ScanStatus::Running {
                return Err(ScanSlotBusy);
            }
        }

        let handle = ScanHandle::new();
        *current = Some(handle.clone());
        Ok(handle)
    }

    /// Marks the slot's run finished with the given terminal status.
    pub fn finish(&self, handle: &ScanHandle, status: ScanStatus) {
        handle.set_status(status);
    }

    /// The most recent run's handle, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn current(&self) -> Option<ScanHandle> {
        self.current.lock().expect("slot lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_rejects_a_second_running_scan() {
        let slot = ScanSlot::new();
        let first = slot.begin().expect("first scan claims the slot");
        assert!(matches!(slot.begin(), Err(ScanSlotBusy)));

        slot.finish(&first, ScanStatus::Completed);
        assert!(slot.begin().is_ok(), "slot frees up after completion");
    }

    #[test]
    fn cancel_is_ignored_once_finished() {
        let slot = ScanSlot::new();
        let handle = slot.begin().unwrap();
        slot.finish(&handle, ScanStatus::Completed);

        handle.request_cancel();
        assert!(!handle.cancel_token().is_cancelled());
        assert_eq!(handle.status(), ScanStatus::Completed);
    }

    #[test]
    fn cancel_while_running_trips_the_token() {
        let slot = ScanSlot::new();
        let handle = slot.begin().unwrap();
        handle.request_cancel();
        assert!(handle.cancel_token().is_cancelled());
    }

    #[test]
    fn progress_clamps_and_snapshots() {
        let progress = ScanProgress::new();
        progress.set(1.7, "done-ish");
        let (fraction, label) = progress.snapshot();
        assert!((fraction - 1.0).abs() < f32::EPSILON);
        assert_eq!(label, "done-ish");
    }

    #[test]
    fn current_exposes_the_latest_handle() {
        let slot = ScanSlot::new();
        assert!(slot.current().is_none());
        let handle = slot.begin().unwrap();
        assert_eq!(slot.current().unwrap().status(), ScanStatus::Running);
        slot.finish(&handle, ScanStatus::Cancelled);
        assert_eq!(slot.current().unwrap().status(), ScanStatus::Cancelled);
    }
}
