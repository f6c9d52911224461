use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::reminder::model::DATE_FORMAT;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Message,
    Date,
    Time,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Message => FormField::Date,
            FormField::Date => FormField::Time,
            FormField::Time => FormField::Message,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Message => FormField::Time,
            FormField::Date => FormField::Message,
            FormField::Time => FormField::Date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderFormState {
    pub message: String,
    pub date: String,
    pub time: String,
    pub active_field: FormField,
}

impl ReminderFormState {
    /// Date starts on `today`; the time is left for the user to pick.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            message: String::new(),
            date: today.format(DATE_FORMAT).to_string(),
            time: String::new(),
            active_field: FormField::Message,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.active_field {
            FormField::Message => &mut self.message,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
        }
    }

    pub fn input_char(&mut self, c: char) {
        let field = self.active_field;
        // Date and time only take what their formats can contain.
        let allowed = match field {
            FormField::Message => true,
            FormField::Date => c.is_ascii_digit() || c == '-',
            FormField::Time => c.is_ascii_digit() || c == ':',
        };
        if allowed {
            self.active_mut().push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.active_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.active_field = self.active_field.next();
    }

    pub fn prev_field(&mut self) {
        self.active_field = self.active_field.prev();
    }
}

pub struct ReminderForm;

impl ReminderForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &ReminderFormState) {
        let t = theme::current();

        let form_w = area.width.clamp(30, 56).min(area.width);
        let form_h = area.height.clamp(8, 9).min(area.height);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" Set Reminder ")
            .title_style(t.accent.add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(t.accent);

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // message
            Constraint::Length(1), // date
            Constraint::Length(1), // time
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Message:", &state.message, "", state.active_field == FormField::Message);
        render_field(frame, rows[1], "Date:", &state.date, "YYYY-MM-DD", state.active_field == FormField::Date);
        render_field(frame, rows[2], "Time:", &state.time, "HH:MM", state.active_field == FormField::Time);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", t.dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Set ", t.dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", t.dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[4]);
    }
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    placeholder: &str,
    active: bool,
) {
    let t = theme::current();
    let cursor = if active { "_" } else { "" };
    let style = if active { t.accent } else { Style::default() };

    let mut spans = vec![
        Span::styled(format!("{:<9}", label), t.dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];
    if value.is_empty() && !placeholder.is_empty() {
        spans.push(Span::styled(format!(" {}", placeholder), t.dim));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
