use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use pulseboard_core::{delta, DashboardSnapshot, Delta};

use crate::fmt::{format_count, format_count_compact, format_currency, format_pct};
use crate::tui::app::App;
use crate::tui::themes::Theme;

use super::widgets::delta_span;

struct Tile {
    label: &'static str,
    value: String,
    delta: Option<Delta>,
    /// Shown when the delta is undefined.
    fallback: String,
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = &app.snapshot else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let tiles = kpi_tiles(snapshot);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);
    for (tile, column) in tiles.iter().zip(columns.iter()) {
        render_tile(frame, &app.theme, *column, tile);
    }

    let ratio_tiles = ratio_tiles(snapshot);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[1]);
    for (tile, column) in ratio_tiles.iter().zip(columns.iter()) {
        render_tile(frame, &app.theme, *column, tile);
    }
}

fn kpi_tiles(snapshot: &DashboardSnapshot) -> [Tile; 4] {
    let totals = &snapshot.totals;
    let prev = &snapshot.previous_totals;
    let compare = snapshot.compare;

    [
        Tile {
            label: "Total Reach",
            value: format_count(totals.total_reach()),
            delta: delta(
                compare,
                totals.total_reach() as f64,
                prev.total_reach() as f64,
            ),
            fallback: format!(
                "organic {} · paid {}",
                format_count_compact(totals.organic_reach),
                format_count_compact(totals.paid_reach)
            ),
        },
        Tile {
            label: "Impressions",
            value: format_count(totals.impressions),
            delta: delta(compare, totals.impressions as f64, prev.impressions as f64),
            fallback: format!(
                "{} engagements",
                format_count_compact(totals.engagements)
            ),
        },
        Tile {
            label: "Spend",
            value: format_currency(totals.spend),
            delta: delta(compare, totals.spend, prev.spend),
            fallback: format!("{} clicks", format_count_compact(totals.clicks)),
        },
        Tile {
            label: "Website",
            value: format_count(totals.sessions),
            delta: delta(compare, totals.sessions as f64, prev.sessions as f64),
            fallback: format!(
                "{} conversions",
                format_count_compact(totals.conversions)
            ),
        },
    ]
}

fn ratio_tiles(snapshot: &DashboardSnapshot) -> [Tile; 4] {
    let ratios = &snapshot.ratios;
    let prev = &snapshot.previous_ratios;
    let compare = snapshot.compare;

    [
        Tile {
            label: "CTR",
            value: format_pct(ratios.click_through_rate),
            delta: delta(compare, ratios.click_through_rate, prev.click_through_rate),
            fallback: "clicks / impressions".to_string(),
        },
        Tile {
            label: "CPC",
            value: format_currency(ratios.cost_per_click),
            delta: delta(compare, ratios.cost_per_click, prev.cost_per_click),
            fallback: "spend / clicks".to_string(),
        },
        Tile {
            label: "CPM",
            value: format_currency(ratios.cost_per_mille),
            delta: delta(compare, ratios.cost_per_mille, prev.cost_per_mille),
            fallback: "spend / 1k impressions".to_string(),
        },
        Tile {
            label: "Conversion Rate",
            value: format_pct(ratios.conversion_rate),
            delta: delta(compare, ratios.conversion_rate, prev.conversion_rate),
            fallback: "conversions / sessions".to_string(),
        },
    ]
}

fn render_tile(frame: &mut Frame, theme: &Theme, area: Rect, tile: &Tile) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {} ", tile.label))
        .title_style(Style::default().fg(theme.muted));

    let lines = vec![
        Line::from(Span::styled(
            tile.value.clone(),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(delta_span(theme, tile.delta, tile.fallback.clone())),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
