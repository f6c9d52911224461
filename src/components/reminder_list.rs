use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::reminder::Reminder;
use crate::theme;

pub struct ReminderList;

impl ReminderList {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        reminders: &[Reminder],
        fired: &[bool],
        selected: usize,
        now: DateTime<Local>,
    ) {
        let t = theme::current();
        let w = area.width as usize;

        let title = if w >= 25 {
            format!(" All Reminders ({}) ", reminders.len())
        } else {
            " Reminders ".to_string()
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        if reminders.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No reminders yet. Press n to add one.").style(t.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let items: Vec<ListItem> = reminders
            .iter()
            .enumerate()
            .map(|(i, reminder)| {
                let is_selected = i == selected;
                let when = format!(" {} {}", reminder.date, reminder.time);
                let countdown = if fired.get(i).copied().unwrap_or(false) {
                    " fired".to_string()
                } else {
                    format!(" {}", until(now, reminder.at))
                };
                let id = format!(" #{:<3}", reminder.id);

                let mut fixed = id.len() + when.len();
                let show_countdown = fixed + countdown.len() + 8 <= inner_w;
                if show_countdown {
                    fixed += countdown.len();
                }
                let message = truncate(&reminder.message, inner_w.saturating_sub(fixed + 1));
                let gap = " ".repeat(inner_w.saturating_sub(fixed + message.chars().count()));

                let base = if is_selected { t.selected } else { Default::default() };
                let mut spans = vec![
                    Span::styled(id, if is_selected { t.selected } else { t.dim }),
                    Span::styled(message, base),
                    Span::styled(gap, base),
                    Span::styled(when, if is_selected { t.selected } else { t.accent }),
                ];
                if show_countdown {
                    spans.push(Span::styled(countdown, if is_selected { t.selected } else { t.dim }));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut state = ListState::default().with_selected(Some(selected));
        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// Compact time remaining, e.g. `in 2d 3h`, `in 5m`, or `due`.
pub fn until(now: DateTime<Local>, at: DateTime<Local>) -> String {
    let secs = (at - now).num_seconds();
    if secs <= 0 {
        return "due".to_string();
    }
    let (days, hours, mins) = (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60);
    if days > 0 {
        format!("in {}d {}h", days, hours)
    } else if hours > 0 {
        format!("in {}h {}m", hours, mins)
    } else if mins > 0 {
        format!("in {}m", mins)
    } else {
        "in <1m".to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else if max > 3 {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::{backend::TestBackend, Terminal};

    fn reminder(id: u32, message: &str, at: DateTime<Local>) -> Reminder {
        Reminder {
            id,
            message: message.to_string(),
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M").to_string(),
            at,
        }
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn countdown_formats() {
        let now = Local.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        let d = chrono::Duration::minutes;
        assert_eq!(until(now, now), "due");
        assert_eq!(until(now, now + chrono::Duration::seconds(30)), "in <1m");
        assert_eq!(until(now, now + d(5)), "in 5m");
        assert_eq!(until(now, now + d(125)), "in 2h 5m");
        assert_eq!(until(now, now + d(60 * 27)), "in 1d 3h");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn renders_reminders_in_insertion_order() {
        let now = Local.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
        let reminders = vec![
            reminder(1, "Buy milk", now + chrono::Duration::hours(1)),
            reminder(2, "Call mom", now + chrono::Duration::days(1)),
        ];

        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        terminal
            .draw(|frame| ReminderList::render(frame, frame.area(), &reminders, &[true, false], 0, now))
            .unwrap();

        let text = screen(&terminal);
        assert!(text.contains("All Reminders (2)"));
        let milk = text.find("Buy milk").unwrap();
        let mom = text.find("Call mom").unwrap();
        assert!(milk < mom);
        assert!(text.contains("2030-01-01 09:00"));
        assert!(text.contains("fired"));
        assert!(text.contains("in 1d 0h"));
    }

    #[test]
    fn renders_empty_hint() {
        let now = Local.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(50, 4)).unwrap();
        terminal
            .draw(|frame| ReminderList::render(frame, frame.area(), &[], &[], 0, now))
            .unwrap();
        assert!(screen(&terminal).contains("No reminders yet"));
    }
}
