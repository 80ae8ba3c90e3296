mod accounts;
mod chart;
mod footer;
mod header;
mod overview;
mod series;
mod sources;
pub mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::app::{App, Tab};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(area);

    header::render(frame, app, chunks[0]);

    if let Some(error) = app.error.clone() {
        render_error(frame, app, chunks[1], &error);
    } else if app.snapshot.is_none() {
        render_loading(frame, app, chunks[1]);
    } else {
        match app.current_tab {
            Tab::Overview => overview::render(frame, app, chunks[1]),
            Tab::Series => series::render(frame, app, chunks[1]),
            Tab::Accounts => accounts::render(frame, app, chunks[1]),
            Tab::Sources => sources::render(frame, app, chunks[1]),
        }
    }

    footer::render(frame, app, chunks[2]);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let text = Paragraph::new(Line::from("Loading dashboard data..."))
        .style(Style::default().fg(app.theme.muted))
        .block(block)
        .centered();
    frame.render_widget(text, area);
}

fn render_error(frame: &mut Frame, app: &App, area: Rect, error: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Error ")
        .border_style(Style::default().fg(app.theme.negative));
    let text = Paragraph::new(vec![
        Line::from(error.to_string()),
        Line::from(""),
        Line::from("Press r to retry, q to quit"),
    ])
    .style(Style::default().fg(app.theme.text))
    .block(block)
    .centered();
    frame.render_widget(text, area);
}
