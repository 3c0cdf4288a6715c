//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use latwatch_types::{Provider, Status};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub low: Color,
    pub medium: Color,
    pub high: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Globe outline.
    pub globe: Color,
    pub aws: Color,
    pub gcp: Color,
    pub azure: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    /// Style for filtered-out entries.
    pub hidden: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            low: Color::Green,
            medium: Color::Yellow,
            high: Color::Red,
            border: Color::Gray,
            globe: Color::Blue,
            aws: Color::Rgb(0xFF, 0xC1, 0x07),
            gcp: Color::Rgb(0x18, 0xFF, 0xFF),
            azure: Color::Rgb(0x00, 0xBF, 0xFF),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            hidden: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            low: Color::Green,
            medium: Color::Rgb(0xB8, 0x86, 0x0B),
            high: Color::Red,
            border: Color::DarkGray,
            globe: Color::Blue,
            aws: Color::Rgb(0xE6, 0x8A, 0x00),
            gcp: Color::Rgb(0x00, 0x83, 0x8F),
            azure: Color::Rgb(0x00, 0x5A, 0x9E),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            hidden: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Low => self.low,
            Status::Medium => self.medium,
            Status::High => self.high,
        }
    }

    /// Get style for a latency status
    pub fn status_style(&self, status: Status) -> Style {
        let style = Style::default().fg(self.status_color(status));
        match status {
            Status::High => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    pub fn provider_color(&self, provider: Provider) -> Color {
        match provider {
            Provider::Aws => self.aws,
            Provider::Gcp => self.gcp,
            Provider::Azure => self.azure,
        }
    }
}
