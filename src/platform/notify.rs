use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use color_eyre::eyre::{eyre, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{Importance, Notification, NotificationChannel, NotificationService, Permission};
use crate::config::NotificationConfig;

/// Notification service for a terminal session.
///
/// Every notification is forwarded to the UI as an alert. When the user has
/// granted permission and a desktop command is configured, the command is
/// also run through `sh -c` with the notification in its environment.
pub struct SessionNotifier {
    permission: Mutex<Permission>,
    channels: Mutex<HashMap<String, NotificationChannel>>,
    alerts: mpsc::UnboundedSender<Notification>,
    command: Option<String>,
}

impl SessionNotifier {
    pub fn new(config: &NotificationConfig, alerts: mpsc::UnboundedSender<Notification>) -> Self {
        let permission = match config.enabled {
            Some(true) => Permission::Granted,
            Some(false) => Permission::Denied,
            None => Permission::NotDetermined,
        };

        Self {
            permission: Mutex::new(permission),
            channels: Mutex::new(HashMap::new()),
            alerts,
            command: config.command.clone().filter(|c| !c.trim().is_empty()),
        }
    }

    /// Record the user's answer to the consent popup.
    pub fn answer_prompt(&self, granted: bool) {
        let answer = if granted {
            Permission::Granted
        } else {
            Permission::Denied
        };
        info!(?answer, "Notification permission answered");
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner) = answer;
    }

    pub fn has_channel(&self, id: &str) -> bool {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl NotificationService for SessionNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_permission(&self) -> Permission {
        let permission = self.permission();
        if permission == Permission::NotDetermined {
            debug!("Notification permission not configured, asking in the UI");
        }
        permission
    }

    fn create_channel(&self, channel: &NotificationChannel) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if !channels.contains_key(&channel.id) {
            debug!(
                id = %channel.id,
                name = %channel.name,
                description = %channel.description,
                importance = ?channel.importance,
                "Created notification channel"
            );
            channels.insert(channel.id.clone(), channel.clone());
        }
    }

    fn notify(&self, notification: &Notification) {
        if !self.has_channel(&notification.channel_id) {
            warn!(
                channel = %notification.channel_id,
                "Dropping notification for unregistered channel"
            );
            return;
        }

        if self.alerts.send(notification.clone()).is_err() {
            debug!(id = notification.id, "UI is gone, terminal alert skipped");
        }

        let Some(ref command) = self.command else {
            return;
        };
        if self.permission() != Permission::Granted {
            debug!(id = notification.id, "Desktop notification suppressed, no permission");
            return;
        }
        if let Err(err) = run_command(command, notification) {
            warn!(id = notification.id, error = %err, "Desktop notification failed");
            let _ = self.alerts.send(Notification {
                id: notification.id,
                channel_id: notification.channel_id.clone(),
                title: "Desktop notification failed".to_string(),
                body: err.to_string(),
                importance: Importance::Default,
            });
        }
    }
}

fn run_command(command: &str, notification: &Notification) -> Result<()> {
    let output = Command::new("sh")
        .args(["-c", command])
        .env("REMINDER_ID", notification.id.to_string())
        .env("REMINDER_TITLE", &notification.title)
        .env("REMINDER_MESSAGE", &notification.body)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(eyre!("command exited with {}: {}", output.status, stderr.trim()));
    }

    Ok(())
}
