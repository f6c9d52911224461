mod app;
mod bridge;
mod components;
mod config;
mod logging;
mod platform;
mod reminder;
mod theme;
mod tui;

use std::sync::Arc;
use std::time::Duration;

use app::{App, InputMode};
use bridge::{AlarmBridge, ReminderReceiver};
use color_eyre::Result;
use config::Config;
use crossterm::event::{KeyCode, KeyModifiers};
use platform::{SessionNotifier, TokioAlarmService};
use ratatui::layout::{Constraint, Layout, Rect};
use reminder::{Clock, ReminderList, SystemClock};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    logging::init(&config.log_level)?;
    theme::init(&config.theme);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting remind-tui");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (alert_tx, alert_rx) = mpsc::unbounded_channel();
    let notifier = Arc::new(SessionNotifier::new(&config.notifications, alert_tx));
    let receiver = Arc::new(ReminderReceiver::new(notifier.clone()));
    let alarms = Arc::new(TokioAlarmService::start(receiver, Arc::clone(&clock))?);

    let mut bridge = AlarmBridge::new(alarms, notifier.clone());
    let capabilities = bridge.request_capabilities();

    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let mut list = ReminderList::new(bridge, Arc::clone(&clock), status_tx);
    list.subscribe(|reminders| debug!(count = reminders.len(), "Reminder list changed"));

    let mut app = App::new(list, notifier, clock, status_rx, alert_rx, capabilities);

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, config.notifications.bell);
    tui::restore()?;
    info!("Exiting");
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App, bell: bool) -> Result<()> {
    while app.running {
        if app.poll_background() > 0 && bell {
            if let Err(err) = tui::bell() {
                warn!(error = %err, "Could not ring terminal bell");
            }
        }

        terminal.draw(|frame| {
            let area = frame.area();

            let layout = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

            components::ReminderList::render(
                frame,
                layout[0],
                app.reminders(),
                &app.fired_flags(),
                app.selected,
                app.now(),
            );

            if let Some(ref form) = app.form_state {
                components::ReminderForm::render(frame, area, form);
            }

            if let Some(alert) = app.alerts.front() {
                components::alert::render_alert(frame, area, alert, app.alerts.len() - 1);
            }

            if app.consent_pending {
                components::alert::render_consent(frame, area);
            }

            if app.show_help {
                render_help(frame, area);
            }

            components::StatusBar::render(
                frame,
                layout[1],
                app.input_mode,
                app.status_message.as_deref(),
            );
        })?;

        if let Some(key) = tui::next_key_event(Duration::from_millis(100))? {
            // Status messages are transient
            app.status_message = None;

            if app.consent_pending {
                app.answer_consent(matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')));
                continue;
            }

            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            if !app.alerts.is_empty() {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    app.dismiss_alert();
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('n'), _) => app.open_form(),
        (KeyCode::Char('d'), _) | (KeyCode::Delete, _) => app.delete_selected(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::Modifier;
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let t = theme::current();

    let popup_w = area.width.clamp(30, 46).min(area.width);
    let popup_h = area.height.clamp(12, 16).min(area.height);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(t.accent.add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(t.accent);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = t.accent.add_modifier(Modifier::BOLD);
    let section_style = t.header.add_modifier(Modifier::UNDERLINED);

    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![Span::styled(keys, key_style), Span::raw(desc)])
    };

    let lines = vec![
        Line::from(Span::styled("List", section_style)),
        entry("  j/k       ", "Select next/previous"),
        entry("  n         ", "New reminder"),
        entry("  d         ", "Delete selected reminder"),
        Line::from(""),
        Line::from(Span::styled("Form", section_style)),
        entry("  Tab       ", "Next field"),
        entry("  Enter     ", "Set reminder"),
        entry("  Esc       ", "Cancel"),
        Line::from(""),
        entry("  q         ", "Quit"),
        entry("  Esc       ", "Close popup"),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
