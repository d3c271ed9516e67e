//! Outbound notifications and the sink they are pushed into.
//!
//! Two shapes cross the boundary to the presentation layer:
//!
//! ```text
//! status: {"status": "Stop" | "Pause" | "Run"}
//! update: {"t": f64, "x": f64, "y": f64}
//! ```

use serde::Serialize;

/// Run mode as reported to observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    /// No run in progress.
    Stop,
    /// Run suspended.
    Pause,
    /// Run actively integrating.
    Run,
}

/// Payload of a `status` notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    /// Current run mode.
    pub status: Status,
}

/// Payload of an `update` notification: one committed step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UpdateEvent {
    /// Simulated time after the step.
    pub t: f64,
    /// Prey after the step.
    pub x: f64,
    /// Predator after the step.
    pub y: f64,
}

/// Any outbound notification.
///
/// Serializes untagged, to exactly the payload shape; the event name is
/// available separately from [`event_name`](Self::event_name).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Notification {
    /// Phase report.
    Status(StatusEvent),
    /// Step result.
    Update(UpdateEvent),
}

impl Notification {
    /// Shorthand for a status notification.
    pub fn status(status: Status) -> Self {
        Self::Status(StatusEvent { status })
    }

    /// Shorthand for an update notification.
    pub fn update(t: f64, x: f64, y: f64) -> Self {
        Self::Update(UpdateEvent { t, x, y })
    }

    /// Transport event name: `"status"` or `"update"`.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Update(_) => "update",
        }
    }
}

/// Destination for notifications.
///
/// Called synchronously by the engine while it holds its state lock, so
/// implementations must be quick and must not call back into the
/// controller.
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    fn notify(&self, notification: Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}
