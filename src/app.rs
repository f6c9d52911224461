use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::bridge::Capabilities;
use crate::components::reminder_form::ReminderFormState;
use crate::platform::{Notification, Permission, SessionNotifier, WakeState};
use crate::reminder::{Clock, Reminder, ReminderList, Status};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

pub struct App {
    pub running: bool,
    pub input_mode: InputMode,
    pub selected: usize,
    pub form_state: Option<ReminderFormState>,
    pub status_message: Option<String>,
    pub alerts: VecDeque<Notification>,
    pub show_help: bool,
    pub consent_pending: bool,
    list: ReminderList,
    notifier: Arc<SessionNotifier>,
    clock: Arc<dyn Clock>,
    status_rx: mpsc::UnboundedReceiver<Status>,
    alert_rx: mpsc::UnboundedReceiver<Notification>,
}

impl App {
    pub fn new(
        list: ReminderList,
        notifier: Arc<SessionNotifier>,
        clock: Arc<dyn Clock>,
        status_rx: mpsc::UnboundedReceiver<Status>,
        alert_rx: mpsc::UnboundedReceiver<Notification>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            running: true,
            input_mode: InputMode::Normal,
            selected: 0,
            form_state: None,
            status_message: None,
            alerts: VecDeque::new(),
            show_help: false,
            consent_pending: capabilities.notifications == Permission::NotDetermined,
            list,
            notifier,
            clock,
            status_rx,
            alert_rx,
        }
    }

    pub fn reminders(&self) -> &[Reminder] {
        self.list.reminders()
    }

    /// Whether each listed reminder's alarm has already gone off.
    pub fn fired_flags(&self) -> Vec<bool> {
        let bridge = self.list.bridge();
        self.reminders()
            .iter()
            .map(|r| bridge.wake_state(r.id) == WakeState::Fired)
            .collect()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Drain status and alert channels. Returns how many new alerts arrived.
    pub fn poll_background(&mut self) -> usize {
        while let Ok(status) = self.status_rx.try_recv() {
            self.status_message = Some(status.to_string());
        }

        let mut arrived = 0;
        while let Ok(alert) = self.alert_rx.try_recv() {
            self.alerts.push_back(alert);
            arrived += 1;
        }
        arrived
    }

    pub fn answer_consent(&mut self, granted: bool) {
        self.consent_pending = false;
        self.notifier.answer_prompt(granted);
        self.status_message = Some(if granted {
            "Desktop notifications allowed".to_string()
        } else {
            "Desktop notifications off for this session".to_string()
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn select_next(&mut self) {
        let len = self.reminders().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.reminders().get(self.selected).map(|r| r.id) else {
            return;
        };
        self.list.delete_reminder(id);
        self.clamp_selection();
    }

    pub fn open_form(&mut self) {
        self.form_state = Some(ReminderFormState::new(self.now().date_naive()));
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    /// The form stays open on validation failure so the user can fix it.
    pub fn submit_form(&mut self) {
        let Some(ref form) = self.form_state else {
            return;
        };
        let (message, date, time) = (form.message.clone(), form.date.clone(), form.time.clone());

        if self.list.add_reminder(&message, &date, &time).is_ok() {
            self.close_form();
            self.selected = self.reminders().len().saturating_sub(1);
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut form) = self.form_state {
            form.input_char(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.backspace();
        }
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.next_field();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.prev_field();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.reminders().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
