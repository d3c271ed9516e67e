//! Ready-made notification sinks.
//!
//! - [`ChannelSink`] forwards notifications over a crossbeam channel, so a
//!   transport thread can drain them without ever touching the engine lock.
//! - [`LogSink`] writes them to the `log` facade.

use crossbeam_channel::{Receiver, Sender};
use volterra_core::{Notification, NotificationSink};

/// Forwards every notification into an unbounded channel.
///
/// Sends never block. If the receiver has been dropped, notifications are
/// discarded.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<Notification>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes it.
    pub fn new() -> (Self, Receiver<Notification>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // Best-effort: the observer may have gone away.
        let _ = self.tx.send(notification);
    }
}

/// Writes each notification to the logger as `event payload-json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match serde_json::to_string(&notification) {
            Ok(json) => log::info!("{} {json}", notification.event_name()),
            Err(e) => log::warn!("unserializable {} notification: {e}", notification.event_name()),
        }
    }
}
