use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::InputMode;
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    /// Left: mode. Right: the pending status message, or key hints sized to
    /// the terminal width.
    pub fn render(frame: &mut Frame, area: Rect, mode: InputMode, message: Option<&str>) {
        let t = theme::current();
        let w = area.width as usize;

        let mode_str = match mode {
            InputMode::Normal => " Reminders ",
            InputMode::Form => " Reminders [New] ",
        };

        let right = match (message, mode) {
            (Some(msg), _) => format!(" {} ", msg),
            (None, InputMode::Form) => " Tab:Next Enter:Set Esc:Cancel ".to_string(),
            (None, InputMode::Normal) if w >= 60 => {
                " n:New d:Delete jk:Select ?:Help q:Quit ".to_string()
            }
            (None, InputMode::Normal) if w >= 36 => " n:New d:Del q:Quit ".to_string(),
            (None, InputMode::Normal) => " ?:Help ".to_string(),
        };

        let padding = " ".repeat(w.saturating_sub(mode_str.len() + right.chars().count()));

        let line = Line::from(vec![
            Span::styled(mode_str, t.status),
            Span::styled(padding, t.status),
            Span::styled(right, t.status),
        ]);

        frame.render_widget(Paragraph::new(line).style(t.status), area);
    }
}
