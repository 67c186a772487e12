//! Full-screen multi-line editor for a single prompt.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::config::{matches, Keybindings};
use crate::ui::{text_input::TextBuffer, theme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Continue,
    Cancel,
    Save(String),
}

#[derive(Debug, Clone)]
pub struct PromptEditor {
    index: usize,
    buffer: TextBuffer,
}

impl PromptEditor {
    pub fn new(index: usize, text: &str) -> Self {
        Self {
            index,
            buffer: TextBuffer::multiline(text),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn handle_key(&mut self, key: &str, keys: &Keybindings) -> EditorOutcome {
        let editor = &keys.editor;
        match key {
            "up" => self.buffer.move_vertical(-1),
            "down" => self.buffer.move_vertical(1),
            _ if matches(key, &editor.cancel) => return EditorOutcome::Cancel,
            _ if matches(key, &editor.save) => {
                return EditorOutcome::Save(self.buffer.text().to_string())
            }
            _ if matches(key, &editor.new_line) => {
                self.buffer.newline();
            }
            _ if matches(key, &editor.delete_line) => self.buffer.delete_line(),
            _ if matches(key, &editor.line_start) => self.buffer.line_start(),
            _ if matches(key, &editor.line_end) => self.buffer.line_end(),
            "tab" => self.buffer.tab(),
            _ => {
                self.buffer.apply_key(key);
            }
        }
        EditorOutcome::Continue
    }

    pub fn draw(&self, frame: &mut Frame<'_>, area: Rect, keys: &Keybindings) {
        let width = area.width.saturating_sub(8).clamp(40, 120).min(area.width);
        let height = area.height.saturating_sub(4).max(6).min(area.height);
        let outer = crate::modal::render::centered(area, width, height);
        let row = |offset: u16, rows: u16| Rect {
            x: outer.x,
            y: outer.y + offset.min(outer.height),
            width: outer.width,
            height: rows.min(outer.height.saturating_sub(offset)),
        };

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("Edit Prompt {}", self.index + 1),
                theme::title(),
            )),
            row(0, 1),
        );

        let box_rows = outer.height.saturating_sub(4);
        let inner_rows = usize::from(box_rows.saturating_sub(2)).max(1);
        let inner_cols = usize::from(outer.width.saturating_sub(2)).max(1);
        let (cursor_row, cursor_col) = self.buffer.cursor_position();
        let scroll_rows = cursor_row.saturating_sub(inner_rows - 1) as u16;
        let scroll_cols = cursor_col.saturating_sub(inner_cols - 1) as u16;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::PURPLE));
        frame.render_widget(
            Paragraph::new(
                self.buffer
                    .styled_lines(theme::input(), theme::cursor(), true),
            )
            .scroll((scroll_rows, scroll_cols))
            .block(block),
            row(2, box_rows),
        );

        let (line, col) = (cursor_row + 1, cursor_col + 1);
        let help = format!(
            "Ln {line}, Col {col}  •  {} save • {} cancel • {} line start • {} line end • {} delete line",
            keys.editor.save,
            keys.editor.cancel,
            keys.editor.line_start,
            keys.editor.line_end,
            keys.editor.delete_line
        );
        frame.render_widget(
            Paragraph::new(Line::styled(help, theme::help())),
            row(outer.height.saturating_sub(1), 1),
        );
    }
}
