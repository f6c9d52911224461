use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::clock::Clock;
use super::model::{Reminder, ReminderId, Schedule, Status, ValidationError};
use crate::bridge::AlarmBridge;

type Observer = Box<dyn FnMut(&[Reminder])>;

/// In-memory reminder list for the current session.
///
/// Owns the reminders, hands out ids, and keeps the alarm bridge in step with
/// adds and deletes. Outcomes are reported as [`Status`] messages on a
/// fire-and-forget channel.
pub struct ReminderList {
    reminders: Vec<Reminder>,
    next_id: ReminderId,
    bridge: AlarmBridge,
    clock: Arc<dyn Clock>,
    status: mpsc::UnboundedSender<Status>,
    observers: Vec<Observer>,
}

impl ReminderList {
    pub fn new(
        bridge: AlarmBridge,
        clock: Arc<dyn Clock>,
        status: mpsc::UnboundedSender<Status>,
    ) -> Self {
        Self {
            reminders: Vec::new(),
            next_id: 1,
            bridge,
            clock,
            status,
            observers: Vec::new(),
        }
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn bridge(&self) -> &AlarmBridge {
        &self.bridge
    }

    /// Register a view to be called synchronously after every change.
    pub fn subscribe(&mut self, observer: impl FnMut(&[Reminder]) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add_reminder(
        &mut self,
        message: &str,
        date: &str,
        time: &str,
    ) -> Result<Reminder, ValidationError> {
        match self.validate(message, date, time) {
            Ok(schedule) => {
                let reminder = Reminder {
                    id: self.next_id,
                    message: message.to_string(),
                    date: schedule.date_string(),
                    time: schedule.time_string(),
                    at: schedule.at,
                };
                self.next_id += 1;
                self.reminders.push(reminder.clone());

                self.bridge
                    .schedule_wake(reminder.id, &reminder.message, reminder.at);
                info!(id = reminder.id, at = %reminder.at, "Reminder added");

                self.emit(Status::ReminderSet {
                    date: reminder.date.clone(),
                    time: reminder.time.clone(),
                });
                self.notify_observers();
                Ok(reminder)
            }
            Err(err) => {
                debug!(error = %err, "Reminder rejected");
                self.emit(Status::Rejected(err.clone()));
                Err(err)
            }
        }
    }

    pub fn delete_reminder(&mut self, id: ReminderId) {
        let Some(index) = self.reminders.iter().position(|r| r.id == id) else {
            debug!(id, "Delete of unknown reminder ignored");
            return;
        };

        self.reminders.remove(index);
        self.bridge.cancel_wake(id);
        info!(id, "Reminder deleted");

        self.emit(Status::ReminderDeleted);
        self.notify_observers();
    }

    fn validate(&self, message: &str, date: &str, time: &str) -> Result<Schedule, ValidationError> {
        if [message, date, time].iter().any(|field| field.trim().is_empty()) {
            return Err(ValidationError::MissingDetails);
        }

        let schedule = Schedule::parse(date, time)?;
        if schedule.at <= self.clock.now() {
            return Err(ValidationError::InPast);
        }
        Ok(schedule)
    }

    fn emit(&self, status: Status) {
        // Nobody listening just means nobody sees the toast.
        let _ = self.status.send(status);
    }

    fn notify_observers(&mut self) {
        for observer in &mut self.observers {
            observer(&self.reminders);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::{AlarmCall, FakeAlarmService, FakeNotifier};
    use crate::platform::{AlarmService, Permission, WakeState};
    use crate::reminder::clock::FixedClock;
    use chrono::{Local, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        list: ReminderList,
        alarms: Arc<FakeAlarmService>,
        status: mpsc::UnboundedReceiver<Status>,
    }

    impl Harness {
        fn statuses(&mut self) -> Vec<String> {
            let mut out = Vec::new();
            while let Ok(status) = self.status.try_recv() {
                out.push(status.to_string());
            }
            out
        }
    }

    /// "Now" is 2029-06-15 12:00 local.
    fn harness() -> Harness {
        let now = Local.with_ymd_and_hms(2029, 6, 15, 12, 0, 0).unwrap();
        let alarms = FakeAlarmService::new();
        let bridge = AlarmBridge::new(alarms.clone(), FakeNotifier::new(Permission::Granted));
        let (tx, status) = mpsc::unbounded_channel();
        Harness {
            list: ReminderList::new(bridge, Arc::new(FixedClock(now)), tx),
            alarms,
            status,
        }
    }

    #[test]
    fn valid_adds_grow_list_by_one_with_increasing_ids() {
        let mut h = harness();
        let mut last = 0;
        for (i, day) in ["2030-01-01", "2030-01-02", "2030-01-03"].iter().enumerate() {
            let reminder = h.list.add_reminder("Water plants", day, "08:30").unwrap();
            assert!(reminder.id > last);
            last = reminder.id;
            assert_eq!(h.list.reminders().len(), i + 1);
        }
        assert_eq!(h.alarms.scheduled().len(), 3);
    }

    #[test]
    fn empty_fields_are_rejected_and_list_unchanged() {
        let mut h = harness();
        h.list.add_reminder("Keep", "2030-01-01", "09:00").unwrap();
        h.statuses();

        for (message, date, time) in [
            ("", "2030-01-01", "09:00"),
            ("Buy milk", "", "09:00"),
            ("Buy milk", "2030-01-01", ""),
            ("   ", "2030-01-01", "09:00"),
        ] {
            assert_eq!(
                h.list.add_reminder(message, date, time),
                Err(ValidationError::MissingDetails)
            );
        }

        assert_eq!(h.list.reminders().len(), 1);
        assert_eq!(h.alarms.scheduled().len(), 1);
        assert_eq!(h.statuses(), vec!["Please enter all details"; 4]);
    }

    #[test]
    fn instant_equal_to_now_is_in_the_past() {
        let mut h = harness();
        assert_eq!(
            h.list.add_reminder("Lunch", "2029-06-15", "12:00"),
            Err(ValidationError::InPast)
        );
        assert!(h.list.reminders().is_empty());
        assert!(h.alarms.calls().is_empty());
    }

    #[test]
    fn earlier_today_is_rejected_with_past_time_status() {
        let mut h = harness();
        assert_eq!(
            h.list.add_reminder("Past event", "2029-06-15", "08:00"),
            Err(ValidationError::InPast)
        );
        assert!(h.list.reminders().is_empty());
        assert_eq!(h.statuses(), vec!["Selected time is in the past!"]);
    }

    #[test]
    fn unparseable_date_is_a_validation_error() {
        let mut h = harness();
        assert_eq!(
            h.list.add_reminder("Oops", "15/06/2030", "09:00"),
            Err(ValidationError::InvalidDateTime)
        );
        assert!(h.list.reminders().is_empty());
    }

    #[test]
    fn rejected_add_does_not_consume_an_id() {
        let mut h = harness();
        let _ = h.list.add_reminder("", "2030-01-01", "09:00");
        let reminder = h.list.add_reminder("First", "2030-01-01", "09:00").unwrap();
        assert_eq!(reminder.id, 1);
    }

    #[test]
    fn add_then_delete_scenario() {
        let mut h = harness();

        let milk = h.list.add_reminder("Buy milk", "2030-01-01", "09:00").unwrap();
        assert_eq!(milk.id, 1);
        assert_eq!(h.list.reminders(), &[milk.clone()]);

        let mom = h.list.add_reminder("Call mom", "2030-01-02", "10:00").unwrap();
        assert_eq!(mom.id, 2);
        assert_eq!(h.list.reminders(), &[milk, mom.clone()]);

        h.list.delete_reminder(1);
        assert_eq!(h.list.reminders(), &[mom]);
        assert_eq!(h.alarms.cancels_of(1), 1);
        assert_eq!(h.alarms.cancels_of(2), 0);
        assert_eq!(h.alarms.state(1), WakeState::Cancelled);
        assert_eq!(h.alarms.state(2), WakeState::Scheduled);

        assert_eq!(
            h.statuses(),
            vec![
                "Reminder set for 2030-01-01 at 09:00",
                "Reminder set for 2030-01-02 at 10:00",
                "Reminder deleted",
            ]
        );
    }

    #[test]
    fn deleting_absent_id_changes_nothing() {
        let mut h = harness();
        h.list.add_reminder("Buy milk", "2030-01-01", "09:00").unwrap();
        h.statuses();
        let before = h.alarms.calls();

        h.list.delete_reminder(42);

        assert_eq!(h.list.reminders().len(), 1);
        assert_eq!(h.alarms.calls(), before);
        assert!(h.statuses().is_empty());
    }

    #[test]
    fn ids_of_deleted_reminders_are_not_reused() {
        let mut h = harness();
        h.list.add_reminder("a", "2030-01-01", "09:00").unwrap();
        h.list.delete_reminder(1);
        let b = h.list.add_reminder("b", "2030-01-01", "09:00").unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn scheduled_wake_carries_the_reminder_payload() {
        let mut h = harness();
        let reminder = h.list.add_reminder("Stretch", "2030-03-01", "07:15").unwrap();
        assert_eq!(
            h.alarms.calls(),
            vec![AlarmCall::Schedule(crate::platform::WakeRequest {
                id: reminder.id,
                message: "Stretch".to_string(),
                at: reminder.at,
            })]
        );
    }

    #[test]
    fn observers_see_every_mutation_synchronously() {
        let mut h = harness();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        h.list.subscribe(move |list| sink.borrow_mut().push(list.len()));

        h.list.add_reminder("a", "2030-01-01", "09:00").unwrap();
        h.list.add_reminder("b", "2030-01-01", "10:00").unwrap();
        let _ = h.list.add_reminder("", "2030-01-01", "10:00");
        h.list.delete_reminder(1);
        h.list.delete_reminder(1);

        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }
}
