use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::platform::{Importance, Notification};
use crate::theme;

fn centered(area: Rect, max_w: u16, max_h: u16) -> Rect {
    let w = area.width.min(max_w);
    let h = area.height.min(max_h);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

/// Popup for a fired reminder. `queued` counts alerts still waiting behind it.
pub fn render_alert(frame: &mut Frame, area: Rect, notification: &Notification, queued: usize) {
    let t = theme::current();
    let popup = centered(area, 50, 8);
    frame.render_widget(Clear, popup);

    let footer = if queued > 0 {
        format!(" Esc:Dismiss ({} more) ", queued)
    } else {
        " Esc:Dismiss ".to_string()
    };

    let frame_style = match notification.importance {
        Importance::High => t.alert,
        Importance::Default => t.border,
    };

    let block = Block::default()
        .title(format!(" {} ", notification.title))
        .title_style(frame_style)
        .title_bottom(Line::from(Span::styled(footer, t.dim)))
        .borders(Borders::ALL)
        .border_style(frame_style);

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            notification.body.clone(),
            t.header.add_modifier(Modifier::BOLD),
        )),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(body, inner);
}

/// One-time notification consent popup.
pub fn render_consent(frame: &mut Frame, area: Rect) {
    let t = theme::current();
    let popup = centered(area, 54, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Notifications ")
        .title_style(t.accent.add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(t.accent);

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let text = vec![
        Line::from("Allow desktop notifications when reminders fire?"),
        Line::from(Span::styled(
            "Reminders still pop up here either way.",
            t.dim,
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", t.accent.add_modifier(Modifier::BOLD)),
            Span::styled(":Allow  ", t.dim),
            Span::styled("any other key", t.accent.add_modifier(Modifier::BOLD)),
            Span::styled(":Don't allow", t.dim),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}
