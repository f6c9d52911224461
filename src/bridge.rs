use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::platform::{
    AlarmService, Importance, Notification, NotificationChannel, NotificationService,
    Permission, WakeHandler, WakeRequest, WakeState,
};
use crate::reminder::ReminderId;

pub const CHANNEL_ID: &str = "reminder_channel";
const CHANNEL_NAME: &str = "Reminder Channel";
const CHANNEL_DESCRIPTION: &str = "Channel for Reminder";
const NOTIFICATION_TITLE: &str = "Reminder";
const FALLBACK_MESSAGE: &str = "Time to check your reminder!";

pub fn reminder_channel() -> NotificationChannel {
    NotificationChannel {
        id: CHANNEL_ID.to_string(),
        name: CHANNEL_NAME.to_string(),
        importance: Importance::High,
        description: CHANNEL_DESCRIPTION.to_string(),
    }
}

/// What the host granted at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub exact_alarms: bool,
    pub notifications: Permission,
}

/// Turns reminders into alarm registrations and back.
pub struct AlarmBridge {
    alarms: Arc<dyn AlarmService>,
    notifications: Arc<dyn NotificationService>,
    exact_prompted: bool,
    notifications_prompted: bool,
}

impl AlarmBridge {
    pub fn new(
        alarms: Arc<dyn AlarmService>,
        notifications: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            alarms,
            notifications,
            exact_prompted: false,
            notifications_prompted: false,
        }
    }

    /// Startup permission pass. Each prompt happens at most once per launch;
    /// the answer never blocks the app.
    pub fn request_capabilities(&mut self) -> Capabilities {
        self.ensure_exact_prompted();

        let notifications = if self.notifications_prompted {
            self.notifications.permission()
        } else {
            self.notifications_prompted = true;
            match self.notifications.permission() {
                Permission::Granted => Permission::Granted,
                _ => self.notifications.request_permission(),
            }
        };

        let capabilities = Capabilities {
            exact_alarms: self.alarms.can_schedule_exact(),
            notifications,
        };
        info!(?capabilities, "Capabilities checked");
        capabilities
    }

    pub fn schedule_wake(&mut self, id: ReminderId, message: &str, at: DateTime<Local>) {
        self.ensure_exact_prompted();
        self.alarms.schedule_exact(WakeRequest {
            id,
            message: message.to_string(),
            at,
        });
    }

    pub fn cancel_wake(&self, id: ReminderId) {
        self.alarms.cancel(id);
    }

    pub fn wake_state(&self, id: ReminderId) -> WakeState {
        self.alarms.state(id)
    }

    fn ensure_exact_prompted(&mut self) {
        if self.exact_prompted {
            return;
        }
        self.exact_prompted = true;
        if !self.alarms.can_schedule_exact() {
            info!("Asking for exact alarm permission");
            self.alarms.request_exact_permission();
        }
    }
}

/// Fired-alarm receiver. Needs nothing but a notification service, so it
/// works no matter what state the rest of the app is in.
pub struct ReminderReceiver {
    notifications: Arc<dyn NotificationService>,
}

impl ReminderReceiver {
    pub fn new(notifications: Arc<dyn NotificationService>) -> Self {
        Self { notifications }
    }
}

impl WakeHandler for ReminderReceiver {
    fn on_wake(&self, request: WakeRequest) {
        self.notifications.create_channel(&reminder_channel());

        let body = if request.message.is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            request.message
        };

        debug!(id = request.id, "Posting reminder notification");
        self.notifications.notify(&Notification {
            id: request.id,
            channel_id: CHANNEL_ID.to_string(),
            title: NOTIFICATION_TITLE.to_string(),
            body,
            importance: Importance::High,
        });
    }
}
