//! Common UI styles and layout helpers

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::context::Theme;
use crate::status::Tone;

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default()
    }

    /// Base colors of the whole frame
    pub fn base(theme: Theme) -> Style {
        match theme {
            Theme::Dark => Style::default(),
            Theme::Light => Style::default().bg(Color::White).fg(Color::Black),
        }
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn warning() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn info() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn inactive() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn active_border() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn inactive_border() -> Style {
        Style::default().fg(Color::Gray)
    }

    /// Badge color for a status tone
    pub fn tone(tone: Tone) -> Style {
        let color = match tone {
            Tone::Primary => Color::Blue,
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Danger => Color::Red,
            Tone::Info => Color::Cyan,
            Tone::Neutral => Color::Gray,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Self::active_border()
        } else {
            Self::inactive_border()
        }
    }
}

/// Footer line of `key: action` hints
pub fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Styles::inactive()));
        }
        spans.push(Span::styled(key.to_string(), Styles::title()));
        spans.push(Span::raw(format!(" {}", action)));
    }
    Line::from(spans)
}

/// Label/value line used by detail panels
pub fn field_line(label: &str, value: &str, label_width: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<width$} ", label, width = label_width), Styles::inactive()),
        Span::raw(value.to_string()),
    ])
}

/// Center a rectangle within another rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fixed-size rectangle anchored to the top-right corner of `r`
pub fn top_right_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(r.x + r.width - width, r.y, width, height)
}

/// Unicode block sparkline of `values`
pub fn sparkline(values: &[u64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let max = values.iter().copied().max().unwrap_or(0);
    values
        .iter()
        .map(|&v| {
            if max == 0 {
                BARS[0]
            } else {
                BARS[((v * 7) / max) as usize]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_scales_to_max() {
        assert_eq!(sparkline(&[0, 7, 14]), "▁▄█");
        assert_eq!(sparkline(&[0, 0]), "▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_rect_helpers_stay_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        let corner = top_right_rect(30, 5, area);
        assert_eq!(corner.right(), 100);
        assert_eq!(corner.y, 0);
        let clipped = top_right_rect(300, 50, area);
        assert_eq!(clipped.width, 100);
    }
}
