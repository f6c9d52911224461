//! Host services the reminder app schedules against.
//!
//! The bridge only ever talks to these traits; the concrete services are an
//! alarm thread driven by tokio timers and a notifier that surfaces alerts in
//! the terminal (and optionally through a desktop command).

pub mod alarm;
#[cfg(test)]
pub mod fake;
pub mod notify;

use chrono::{DateTime, Local};

use crate::reminder::ReminderId;

pub use alarm::TokioAlarmService;
pub use notify::SessionNotifier;

/// Self-contained payload of an alarm registration. Everything the firing
/// path needs travels inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct WakeRequest {
    pub id: ReminderId,
    pub message: String,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeState {
    Unscheduled,
    Scheduled,
    Fired,
    Cancelled,
}

impl WakeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WakeState::Fired | WakeState::Cancelled)
    }
}

/// Receives fired alarms. Runs off the UI thread.
pub trait WakeHandler: Send + Sync {
    fn on_wake(&self, request: WakeRequest);
}

pub trait AlarmService: Send + Sync {
    /// Whether precise wake-ups may be scheduled without asking the user.
    fn can_schedule_exact(&self) -> bool;

    /// Ask the user for the precise wake-up capability. Non-blocking.
    fn request_exact_permission(&self);

    /// One-shot wake-up at `request.at` that still fires after idle or
    /// suspend. Re-using an id replaces its pending registration.
    fn schedule_exact(&self, request: WakeRequest);

    /// Unregister `id`. No-op if it never existed or already fired.
    fn cancel(&self, id: ReminderId);

    fn state(&self, id: ReminderId) -> WakeState;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    NotDetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: ReminderId,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub importance: Importance,
}

pub trait NotificationService: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask for permission to display notifications. Returns the state right
    /// after asking, which may still be `NotDetermined` if the answer arrives
    /// later.
    fn request_permission(&self) -> Permission;

    /// Register a channel. Registering the same id again is a no-op.
    fn create_channel(&self, channel: &NotificationChannel);

    /// Display a notification. Never fails loudly; missing permission only
    /// reduces what is shown.
    fn notify(&self, notification: &Notification);
}
