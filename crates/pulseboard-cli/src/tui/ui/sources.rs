use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use pulseboard_core::SourceTraffic;

use crate::fmt::{format_count, format_pct};
use crate::tui::app::App;
use crate::tui::themes::Theme;

use super::widgets::truncate;

const BAR_WIDTH: usize = 24;
const NAME_WIDTH: usize = 22;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = &app.snapshot else {
        return;
    };
    let theme = &app.theme;
    let total_sessions: u64 = snapshot.sources.iter().map(|s| s.sessions).sum();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(" Traffic by Source ")
        .title_style(Style::default().fg(theme.accent));

    let mut lines: Vec<Line> = Vec::with_capacity(snapshot.sources.len() + 1);
    if snapshot.sources.is_empty() {
        lines.push(Line::from(Span::styled(
            "No web traffic in the selected period",
            Style::default().fg(theme.muted),
        )));
    }
    for (i, source) in snapshot.sources.iter().enumerate() {
        lines.push(source_line(
            theme,
            source,
            total_sessions,
            i == app.selected_row,
        ));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn source_line(
    theme: &Theme,
    source: &SourceTraffic,
    total_sessions: u64,
    selected: bool,
) -> Line<'static> {
    let share = if total_sessions == 0 {
        0.0
    } else {
        source.sessions as f64 / total_sessions as f64
    };
    let filled = (share * BAR_WIDTH as f64).round() as usize;

    let name_style = if selected {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };

    Line::from(vec![
        Span::styled(
            format!("{:<NAME_WIDTH$} ", truncate(&source.source, NAME_WIDTH)),
            name_style,
        ),
        Span::styled("█".repeat(filled), Style::default().fg(theme.accent)),
        Span::styled(
            "░".repeat(BAR_WIDTH - filled),
            Style::default().fg(theme.border),
        ),
        Span::styled(
            format!(
                " {:>6} ({:>5})  {} conv",
                format_count(source.sessions),
                format_pct(share),
                format_count(source.conversions)
            ),
            Style::default().fg(theme.muted),
        ),
    ])
}
