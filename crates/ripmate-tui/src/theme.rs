//! Color palette and shared styles.

use ratatui::style::{Color, Style};

use crate::action::NotificationLevel;

pub const BG_DARK: Color = Color::Rgb(16, 18, 24);
pub const TEXT: Color = Color::Rgb(214, 219, 224);
pub const TEXT_DIM: Color = Color::Rgb(122, 132, 144);
pub const BORDER: Color = Color::Rgb(60, 66, 80);
pub const ACCENT: Color = Color::Rgb(255, 179, 71);
pub const SUCCESS: Color = Color::Rgb(122, 201, 123);
pub const ERROR: Color = Color::Rgb(224, 102, 102);
pub const INFO: Color = Color::Rgb(102, 163, 224);

/// Style for the key-hint line at the bottom of a screen.
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Style for a toast, by severity.
pub fn toast(level: NotificationLevel) -> Style {
    let fg = match level {
        NotificationLevel::Info => INFO,
        NotificationLevel::Error => ERROR,
    };
    Style::default().fg(fg).bg(BG_DARK)
}
