use ratatui::style::Style;
use ratatui::text::Span;

use pulseboard_core::Delta;

use crate::tui::themes::Theme;

/// Delta caption colored by direction, or the muted fallback when the
/// delta is undefined (comparison off or previous value zero).
pub fn delta_span(theme: &Theme, delta: Option<Delta>, fallback: String) -> Span<'static> {
    match delta {
        Some(d) if d.ratio >= 0.0 => {
            Span::styled(d.caption(), Style::default().fg(theme.positive))
        }
        Some(d) => Span::styled(d.caption(), Style::default().fg(theme.negative)),
        None => Span::styled(fallback, Style::default().fg(theme.muted)),
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_strings_untouched() {
        assert_eq!(truncate("linkedin", 10), "linkedin");
        assert_eq!(truncate("linkedin", 8), "linkedin");
    }

    #[test]
    fn truncate_long_strings_with_ellipsis() {
        assert_eq!(truncate("newsletter / email", 11), "newsletter…");
    }
}
