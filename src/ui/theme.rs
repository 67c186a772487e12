use ratatui::style::{Color, Modifier, Style};

// Dracula palette
pub const PURPLE: Color = Color::Rgb(189, 147, 249);
pub const CYAN: Color = Color::Rgb(139, 233, 253);
pub const PINK: Color = Color::Rgb(255, 121, 198);
pub const GREEN: Color = Color::Rgb(80, 250, 123);
pub const YELLOW: Color = Color::Rgb(241, 250, 140);
pub const ORANGE: Color = Color::Rgb(255, 184, 108);
pub const RED: Color = Color::Rgb(255, 85, 85);
pub const SUBTLE: Color = Color::Rgb(98, 114, 164);
pub const WHITE: Color = Color::Rgb(248, 248, 242);

pub fn title() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn item() -> Style {
    Style::default().fg(WHITE)
}

pub fn selected() -> Style {
    Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
}

pub fn cursor() -> Style {
    Style::default().fg(PINK).add_modifier(Modifier::BOLD)
}

pub fn help() -> Style {
    Style::default().fg(SUBTLE)
}

pub fn branch() -> Style {
    Style::default().fg(PINK)
}

pub fn label() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn input() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}

pub fn error() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::BOLD)
}

pub fn prompt() -> Style {
    Style::default().fg(PURPLE)
}

pub fn confirm() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}

pub fn banner() -> Style {
    Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)
}

pub fn status() -> Style {
    Style::default().fg(YELLOW)
}
