//! Test utilities for Volterra development.
//!
//! Provides [`RecordingSink`], a notification sink that keeps everything it
//! receives for later assertions, and [`wait_until`] for deadline-bounded
//! polling of background-thread effects.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use volterra_core::{Notification, NotificationSink, Status, UpdateEvent};

/// Sink that records every notification in arrival order.
///
/// Clones share the same log, so a test can hand one clone to the
/// controller and keep another for inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    pub fn all(&self) -> Vec<Notification> {
        self.log.lock().unwrap().clone()
    }

    /// Number of notifications received so far.
    pub fn len(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Only the update notifications, in order.
    pub fn updates(&self) -> Vec<UpdateEvent> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Update(u) => Some(u),
                Notification::Status(_) => None,
            })
            .collect()
    }

    /// Only the status values, in order.
    pub fn statuses(&self) -> Vec<Status> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Status(s) => Some(s.status),
                Notification::Update(_) => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.log.lock().unwrap().push(notification);
    }
}

/// Poll `cond` every few milliseconds until it holds or `timeout` passes.
/// Returns whether it held.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let sink = RecordingSink::new();
        let handle = sink.clone();
        sink.notify(Notification::status(Status::Run));
        sink.notify(Notification::update(1.0, 2.0, 3.0));
        assert_eq!(handle.len(), 2);
        assert_eq!(handle.statuses(), vec![Status::Run]);
        assert_eq!(handle.updates().len(), 1);
        handle.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn wait_until_times_out() {
        assert!(!wait_until(Duration::from_millis(10), || false));
        assert!(wait_until(Duration::from_millis(10), || true));
    }
}
