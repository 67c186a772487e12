//! Render crossterm key events as the key strings used by keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// `ctrl+u`, `shift+tab`, `pgdown`, `space`, `G`, ... Empty for keys we never bind.
pub fn key_string(key: &KeyEvent) -> String {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let base = match key.code {
        KeyCode::Char(c) => {
            if ctrl {
                return format!("ctrl+{}", c.to_ascii_lowercase());
            }
            if alt {
                return format!("alt+{c}");
            }
            // Shifted letters already arrive uppercase.
            return if c == ' ' {
                "space".to_string()
            } else {
                c.to_string()
            };
        }
        KeyCode::BackTab => return "shift+tab".to_string(),
        KeyCode::Enter => "enter",
        KeyCode::Esc => "esc",
        KeyCode::Backspace => "backspace",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Tab => "tab",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pgup",
        KeyCode::PageDown => "pgdown",
        KeyCode::F(n) => return with_modifiers(&format!("f{n}"), ctrl, alt, shift),
        _ => return String::new(),
    };
    with_modifiers(base, ctrl, alt, shift)
}

fn with_modifiers(base: &str, ctrl: bool, alt: bool, shift: bool) -> String {
    let mut out = String::new();
    if ctrl {
        out.push_str("ctrl+");
    }
    if alt {
        out.push_str("alt+");
    }
    if shift {
        out.push_str("shift+");
    }
    out.push_str(base);
    out
}

/// A key string that inserts itself as text.
pub fn printable(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}
