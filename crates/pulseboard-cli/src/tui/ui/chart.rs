//! Stacked daily bar chart rendered with sub-cell block characters.
//!
//! One terminal column per bar; vertical resolution is eight sub-cells
//! per row. When the range holds more bars than the area is wide, the
//! most recent bars win.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::themes::Theme;

const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct StackedBar {
    pub label: String,
    /// Bottom-up segments as (value, color).
    pub segments: Vec<(u64, Color)>,
}

impl StackedBar {
    pub fn total(&self) -> u64 {
        self.segments.iter().map(|(value, _)| value).sum()
    }
}

pub fn render(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    title: &str,
    legend: &[(&str, Color)],
    bars: &[StackedBar],
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {title} "))
        .title_style(Style::default().fg(theme.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 4 {
        return;
    }

    // One line of legend, the chart body, one line of date labels.
    let chart_height = (inner.height - 2) as usize;
    let visible = inner.width as usize;
    let shown = if bars.len() > visible {
        &bars[bars.len() - visible..]
    } else {
        bars
    };

    let max_total = shown.iter().map(StackedBar::total).max().unwrap_or(0);
    let mut lines: Vec<Line> = Vec::with_capacity(chart_height + 2);

    let mut legend_spans: Vec<Span> = Vec::new();
    for (name, color) in legend {
        legend_spans.push(Span::styled("■ ", Style::default().fg(*color)));
        legend_spans.push(Span::styled(
            format!("{name}  "),
            Style::default().fg(theme.muted),
        ));
    }
    lines.push(Line::from(legend_spans));

    for row in (0..chart_height).rev() {
        let mut spans: Vec<Span> = Vec::with_capacity(shown.len());
        for bar in shown {
            spans.push(bar_cell(bar, max_total, chart_height, row, theme));
        }
        lines.push(Line::from(spans));
    }

    lines.push(axis_line(shown, inner.width as usize, theme));
    frame.render_widget(Paragraph::new(lines), inner);
}

/// The character and color a bar contributes at `row` (0 = bottom row).
fn bar_cell(
    bar: &StackedBar,
    max_total: u64,
    chart_height: usize,
    row: usize,
    theme: &Theme,
) -> Span<'static> {
    let total = bar.total();
    if total == 0 || max_total == 0 {
        return Span::raw(" ");
    }

    // Fill height in eighths of a cell.
    let fill = ((total as f64 / max_total as f64) * chart_height as f64 * 8.0).round() as usize;
    let cell_floor = row * 8;
    let eighths_here = fill.saturating_sub(cell_floor).min(8);
    if eighths_here == 0 {
        return Span::raw(" ");
    }

    // Color by the segment owning the top filled eighth of this cell.
    let probe = (cell_floor + eighths_here - 1) as f64 / fill as f64 * total as f64;
    let mut cumulative = 0u64;
    let mut color = theme.muted;
    for (value, segment_color) in &bar.segments {
        cumulative += value;
        color = *segment_color;
        if probe < cumulative as f64 {
            break;
        }
    }
    Span::styled(BLOCKS[eighths_here].to_string(), Style::default().fg(color))
}

fn axis_line(shown: &[StackedBar], width: usize, theme: &Theme) -> Line<'static> {
    let first = shown
        .iter()
        .map(|b| b.label.as_str())
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let last = shown
        .iter()
        .rev()
        .map(|b| b.label.as_str())
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let gap = width.saturating_sub(first.len() + last.len());
    Line::from(Span::styled(
        format!("{first}{}{last}", " ".repeat(gap)),
        Style::default().fg(theme.muted),
    ))
}
