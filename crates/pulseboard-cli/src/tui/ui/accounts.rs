use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::fmt::{format_count, format_currency};
use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = &app.snapshot else {
        return;
    };
    let theme = &app.theme;

    let header = Row::new(vec![
        "Account",
        "Type",
        "Organic",
        "Paid",
        "Impressions",
        "Clicks",
        "Engagements",
        "Spend",
    ])
    .style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = snapshot
        .accounts
        .iter()
        .map(|account| {
            Row::new(vec![
                Cell::from(account.name.clone()),
                Cell::from(account.kind.as_str()),
                Cell::from(format_count(account.organic_reach)),
                Cell::from(format_count(account.paid_reach)),
                Cell::from(format_count(account.impressions)),
                Cell::from(format_count(account.clicks)),
                Cell::from(format_count(account.engagements)),
                Cell::from(format_currency(account.spend)),
            ])
            .style(Style::default().fg(theme.text))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .bg(theme.highlight)
            .add_modifier(Modifier::BOLD),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(" Accounts ")
            .title_style(Style::default().fg(theme.accent)),
    );

    let mut state = TableState::default();
    if !snapshot.accounts.is_empty() {
        state.select(Some(app.selected_row.min(snapshot.accounts.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
