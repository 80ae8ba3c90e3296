use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::app::App;

/// Three lines: account toggles + active filters, key hints, status.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(filter_line(app), rows[0]);
    frame.render_widget(hint_line(app), rows[1]);
    frame.render_widget(status_line(app), rows[2]);
}

fn filter_line(app: &App) -> Paragraph<'_> {
    let mut spans: Vec<Span> = Vec::new();
    for (i, account) in app.roster.iter().enumerate() {
        let enabled = app.account_selected(&account.id);
        let style = if enabled {
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted)
        };
        let marker = if enabled { "●" } else { "○" };
        spans.push(Span::styled(
            format!("[{}] {} {}  ", i + 1, marker, account.name),
            style,
        ));
    }
    spans.push(Span::styled(
        format!("│ {} ", app.filter.range.label()),
        Style::default().fg(app.theme.text),
    ));
    spans.push(Span::styled(
        if app.filter.compare {
            "│ compare: on"
        } else {
            "│ compare: off"
        },
        Style::default().fg(if app.filter.compare {
            app.theme.positive
        } else {
            app.theme.muted
        }),
    ));
    Paragraph::new(Line::from(spans))
}

fn hint_line(app: &App) -> Paragraph<'_> {
    let hints = [
        ("tab/←→", "switch tab"),
        ("1-9", "toggle account"),
        ("d", "date range"),
        ("c", "compare"),
        ("r", "reload"),
        ("e", "export csv"),
        ("p", "theme"),
        ("q", "quit"),
    ];
    let mut spans: Vec<Span> = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(
            key,
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {action}  "),
            Style::default().fg(app.theme.muted),
        ));
    }
    Paragraph::new(Line::from(spans))
}

fn status_line(app: &App) -> Paragraph<'_> {
    let line = match &app.status_message {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(app.theme.positive),
        )),
        None if app.loading => Line::from(Span::styled(
            "Loading...",
            Style::default().fg(app.theme.muted),
        )),
        None => Line::from(""),
    };
    Paragraph::new(line)
}
