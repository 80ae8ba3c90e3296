use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use pulseboard_core::AggregatedDay;

use crate::tui::app::App;
use crate::tui::themes::Theme;

use super::chart::{self, StackedBar};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = &app.snapshot else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let theme = &app.theme;
    let reach_bars = reach_bars(&snapshot.days, snapshot.compare, theme);
    let activity_bars = activity_bars(&snapshot.days, theme);
    let web_bars = web_bars(&snapshot.days, snapshot.compare, theme);

    let mut reach_legend = vec![("organic", theme.series[0]), ("paid", theme.series[1])];
    let activity_legend = vec![
        ("impressions", theme.series[0]),
        ("clicks", theme.series[2]),
        ("spend", theme.series[1]),
    ];
    let mut web_legend = vec![
        ("sessions", theme.series[2]),
        ("conversions", theme.series[3]),
    ];
    if snapshot.compare {
        reach_legend.push(("prev", theme.muted));
        web_legend.push(("prev", theme.muted));
    }

    chart::render(frame, theme, rows[0], "Reach", &reach_legend, &reach_bars);
    chart::render(
        frame,
        theme,
        rows[1],
        "Impressions, Clicks & Spend",
        &activity_legend,
        &activity_bars,
    );
    chart::render(frame, theme, rows[2], "Website", &web_legend, &web_bars);
}

/// One column per day, organic stacked under paid. With comparison on,
/// each day gets a second muted column carrying the positionally aligned
/// previous value.
fn reach_bars(days: &[AggregatedDay], compare: bool, theme: &Theme) -> Vec<StackedBar> {
    let mut bars = Vec::with_capacity(days.len() * if compare { 2 } else { 1 });
    for day in days {
        bars.push(StackedBar {
            label: day.date.clone(),
            segments: vec![
                (day.organic_reach, theme.series[0]),
                (day.paid_reach, theme.series[1]),
            ],
        });
        if compare {
            bars.push(StackedBar {
                label: String::new(),
                segments: vec![(day.prev_reach, theme.muted)],
            });
        }
    }
    bars
}

/// Impressions stacked under clicks, with spend as its own second column
/// per day. Spend shares the chart scale, so it reads as a short bar next
/// to the impression volume.
fn activity_bars(days: &[AggregatedDay], theme: &Theme) -> Vec<StackedBar> {
    let mut bars = Vec::with_capacity(days.len() * 2);
    for day in days {
        bars.push(StackedBar {
            label: day.date.clone(),
            segments: vec![
                (day.impressions, theme.series[0]),
                (day.clicks, theme.series[2]),
            ],
        });
        bars.push(StackedBar {
            label: String::new(),
            segments: vec![(day.spend.round() as u64, theme.series[1])],
        });
    }
    bars
}

fn web_bars(days: &[AggregatedDay], compare: bool, theme: &Theme) -> Vec<StackedBar> {
    let mut bars = Vec::with_capacity(days.len() * if compare { 2 } else { 1 });
    for day in days {
        bars.push(StackedBar {
            label: day.date.clone(),
            segments: vec![
                (day.sessions, theme.series[2]),
                (day.conversions, theme.series[3]),
            ],
        });
        if compare {
            bars.push(StackedBar {
                label: String::new(),
                segments: vec![(day.prev_sessions, theme.muted)],
            });
        }
    }
    bars
}
