//! In-memory stand-ins for the host services, for tests.

use std::sync::{Arc, Mutex};

use super::alarm::WakeLedger;
use super::{
    AlarmService, Notification, NotificationChannel, NotificationService, Permission,
    WakeRequest, WakeState,
};
use crate::reminder::ReminderId;

#[derive(Debug, Clone, PartialEq)]
pub enum AlarmCall {
    RequestExactPermission,
    Schedule(WakeRequest),
    Cancel(ReminderId),
}

/// Records every call; alarms only fire when a test says so.
pub struct FakeAlarmService {
    pub exact_allowed: bool,
    pub calls: Mutex<Vec<AlarmCall>>,
    ledger: WakeLedger,
}

impl FakeAlarmService {
    pub fn new() -> Arc<Self> {
        Self::with_exact(true)
    }

    pub fn with_exact(exact_allowed: bool) -> Arc<Self> {
        Arc::new(Self {
            exact_allowed,
            calls: Mutex::new(Vec::new()),
            ledger: WakeLedger::default(),
        })
    }

    pub fn calls(&self) -> Vec<AlarmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scheduled(&self) -> Vec<WakeRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AlarmCall::Schedule(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn cancels_of(&self, id: ReminderId) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == AlarmCall::Cancel(id))
            .count()
    }

    /// Simulate the platform firing `id`. Returns the payload if it fired.
    pub fn fire(&self, id: ReminderId) -> Option<WakeRequest> {
        if !self.ledger.fire(id) {
            return None;
        }
        self.scheduled().into_iter().rev().find(|r| r.id == id)
    }
}

impl AlarmService for FakeAlarmService {
    fn can_schedule_exact(&self) -> bool {
        self.exact_allowed
    }

    fn request_exact_permission(&self) {
        self.calls.lock().unwrap().push(AlarmCall::RequestExactPermission);
    }

    fn schedule_exact(&self, request: WakeRequest) {
        self.ledger.schedule(request.id);
        self.calls.lock().unwrap().push(AlarmCall::Schedule(request));
    }

    fn cancel(&self, id: ReminderId) {
        self.ledger.cancel(id);
        self.calls.lock().unwrap().push(AlarmCall::Cancel(id));
    }

    fn state(&self, id: ReminderId) -> WakeState {
        self.ledger.state(id)
    }
}

pub struct FakeNotifier {
    pub permission: Mutex<Permission>,
    pub permission_requests: Mutex<usize>,
    pub channels: Mutex<Vec<NotificationChannel>>,
    pub shown: Mutex<Vec<Notification>>,
}

impl FakeNotifier {
    pub fn new(permission: Permission) -> Arc<Self> {
        Arc::new(Self {
            permission: Mutex::new(permission),
            permission_requests: Mutex::new(0),
            channels: Mutex::new(Vec::new()),
            shown: Mutex::new(Vec::new()),
        })
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

impl NotificationService for FakeNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    fn request_permission(&self) -> Permission {
        *self.permission_requests.lock().unwrap() += 1;
        self.permission()
    }

    fn create_channel(&self, channel: &NotificationChannel) {
        let mut channels = self.channels.lock().unwrap();
        if !channels.iter().any(|c| c.id == channel.id) {
            channels.push(channel.clone());
        }
    }

    fn notify(&self, notification: &Notification) {
        let registered = self
            .channels
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.id == notification.channel_id);
        if registered && self.permission() != Permission::Denied {
            self.shown.lock().unwrap().push(notification.clone());
        }
    }
}
