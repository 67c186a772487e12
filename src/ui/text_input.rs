//! Editable text with a character cursor, shared by the commit editor, the
//! todo form and the prompt editor.

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::keys::printable;
use crate::utf8_safe::{byte_index, char_count};

const CURSOR_GLYPH: &str = "█";
const TAB_SPACES: &str = "    ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    /// Cursor position in chars.
    cursor: usize,
    limit: Option<usize>,
    multiline: bool,
}

impl TextBuffer {
    /// Single-line input, cursor at the end.
    pub fn single_line(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let text = text.replace('\n', " ");
        let cursor = char_count(&text);
        Self {
            text,
            cursor,
            limit: None,
            multiline: false,
        }
    }

    pub fn multiline(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = char_count(&text);
        Self {
            text,
            cursor,
            limit: None,
            multiline: true,
        }
    }

    /// Cap the length in chars, truncating existing text.
    pub fn with_limit(mut self, limit: usize) -> Self {
        if char_count(&self.text) > limit {
            self.text.truncate(byte_index(&self.text, limit));
        }
        self.cursor = self.cursor.min(limit);
        self.limit = Some(limit);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        char_count(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn byte_cursor(&self) -> usize {
        byte_index(&self.text, self.cursor)
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        if c == '\n' && !self.multiline {
            return false;
        }
        if self.limit.is_some_and(|limit| self.len() >= limit) {
            return false;
        }
        let at = self.byte_cursor();
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            if !self.insert_char(c) {
                break;
            }
        }
    }

    pub fn newline(&mut self) -> bool {
        self.insert_char('\n')
    }

    pub fn tab(&mut self) {
        self.insert_str(TAB_SPACES);
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_cursor();
        self.text.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let at = self.byte_cursor();
        self.text.remove(at);
        true
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    /// (row, column) of the cursor, both in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.byte_cursor()];
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(char_count).unwrap_or(0);
        (row, col)
    }

    fn line_lengths(&self) -> Vec<usize> {
        self.text.split('\n').map(char_count).collect()
    }

    fn offset_of(lengths: &[usize], row: usize, col: usize) -> usize {
        lengths[..row].iter().map(|len| len + 1).sum::<usize>() + col.min(lengths[row])
    }

    pub fn line_start(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = Self::offset_of(&self.line_lengths(), row, 0);
    }

    pub fn line_end(&mut self) {
        let (row, _) = self.cursor_position();
        let lengths = self.line_lengths();
        self.cursor = Self::offset_of(&lengths, row, lengths[row]);
    }

    /// Move to the same column of the previous (`-1`) or next (`1`) line,
    /// clamped to that line's length.
    pub fn move_vertical(&mut self, direction: isize) {
        let (row, col) = self.cursor_position();
        let lengths = self.line_lengths();
        let target = row
            .saturating_add_signed(direction)
            .min(lengths.len().saturating_sub(1));
        self.cursor = Self::offset_of(&lengths, target, col);
    }

    /// Remove the cursor's line, including its newline.
    pub fn delete_line(&mut self) {
        let (row, _) = self.cursor_position();
        let mut lines: Vec<&str> = self.text.split('\n').collect();
        if lines.len() == 1 {
            self.text.clear();
            self.cursor = 0;
            return;
        }
        lines.remove(row);
        let text = lines.join("\n");
        let lengths: Vec<usize> = lines.iter().map(|line| char_count(line)).collect();
        let target = row.min(lengths.len() - 1);
        self.text = text;
        self.cursor = Self::offset_of(&lengths, target, 0);
    }

    /// Editing keys shared by every input: backspace, delete, arrows,
    /// home/end, space and printable characters. Returns whether the key
    /// was consumed.
    pub fn apply_key(&mut self, key: &str) -> bool {
        match key {
            "backspace" => {
                self.backspace();
            }
            "delete" => {
                self.delete();
            }
            "left" => self.left(),
            "right" => self.right(),
            "home" => self.line_start(),
            "end" => self.line_end(),
            "space" => {
                self.insert_char(' ');
            }
            _ => match printable(key) {
                Some(c) => {
                    self.insert_char(c);
                }
                None => return false,
            },
        }
        true
    }

    /// Lines for rendering, with a block cursor drawn at the cursor when `focused`.
    pub fn styled_lines(&self, style: Style, cursor_style: Style, focused: bool) -> Vec<Line<'static>> {
        let (cursor_row, cursor_col) = self.cursor_position();
        self.text
            .split('\n')
            .enumerate()
            .map(|(row, line)| {
                if !focused || row != cursor_row {
                    return Line::styled(line.to_string(), style);
                }
                let split = byte_index(line, cursor_col);
                Line::from(vec![
                    Span::styled(line[..split].to_string(), style),
                    Span::styled(CURSOR_GLYPH, cursor_style),
                    Span::styled(line[split..].to_string(), style),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_at_cursor_and_moves() {
        let mut buf = TextBuffer::single_line("ac");
        buf.left();
        assert!(buf.apply_key("b"));
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor(), 2);
        buf.apply_key("space");
        assert_eq!(buf.text(), "ab c");
        assert!(!buf.apply_key("ctrl+x"));
    }

    #[test]
    fn backspace_and_delete_respect_bounds() {
        let mut buf = TextBuffer::single_line("héllo");
        assert!(!buf.delete());
        assert!(buf.backspace());
        assert_eq!(buf.text(), "héll");
        buf.line_start();
        assert!(!buf.backspace());
        buf.right();
        assert!(buf.delete());
        assert_eq!(buf.text(), "hll");
    }

    #[test]
    fn single_line_rejects_newlines() {
        let mut buf = TextBuffer::single_line("a\nb");
        assert_eq!(buf.text(), "a b");
        assert!(!buf.newline());
        assert_eq!(buf.text(), "a b");
    }

    #[test]
    fn limit_caps_length() {
        let mut buf = TextBuffer::single_line("abcdef").with_limit(4);
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), 4);
        assert!(!buf.insert_char('x'));
        buf.left();
        buf.backspace();
        assert!(buf.insert_char('z'));
        assert_eq!(buf.text(), "abzd");
    }

    #[test]
    fn cursor_position_tracks_rows() {
        let buf = TextBuffer::multiline("one\ntwo\nthree");
        assert_eq!(buf.cursor_position(), (2, 5));
        let empty = TextBuffer::multiline("");
        assert_eq!(empty.cursor_position(), (0, 0));
    }

    #[test]
    fn vertical_movement_clamps_column() {
        let mut buf = TextBuffer::multiline("a long line\nab\nanother line");
        buf.move_vertical(-1);
        assert_eq!(buf.cursor_position(), (1, 2));
        buf.move_vertical(-1);
        assert_eq!(buf.cursor_position(), (0, 2));
        buf.move_vertical(-1);
        assert_eq!(buf.cursor_position(), (0, 2));
        buf.line_end();
        assert_eq!(buf.cursor_position(), (0, 11));
        buf.move_vertical(1);
        assert_eq!(buf.cursor_position(), (1, 2));
        buf.move_vertical(5);
        assert_eq!(buf.cursor_position(), (2, 2));
    }

    #[test]
    fn line_start_and_end_stay_on_line() {
        let mut buf = TextBuffer::multiline("first\nsecond");
        buf.line_start();
        assert_eq!(buf.cursor(), 6);
        buf.line_end();
        assert_eq!(buf.cursor(), 12);
    }

    #[test]
    fn newline_and_tab_in_multiline() {
        let mut buf = TextBuffer::multiline("ab");
        buf.left();
        buf.newline();
        buf.tab();
        assert_eq!(buf.text(), "a\n    b");
        assert_eq!(buf.cursor_position(), (1, 4));
    }

    #[test]
    fn delete_line_removes_cursor_line() {
        let mut buf = TextBuffer::multiline("one\ntwo\nthree");
        buf.move_vertical(-1);
        buf.delete_line();
        assert_eq!(buf.text(), "one\nthree");
        assert_eq!(buf.cursor_position(), (1, 0));
        buf.delete_line();
        assert_eq!(buf.text(), "one");
        assert_eq!(buf.cursor_position(), (0, 0));
        buf.delete_line();
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn styled_lines_draw_cursor_on_focus() {
        let mut buf = TextBuffer::multiline("ab\ncd");
        buf.move_vertical(-1);
        let lines = buf.styled_lines(Style::default(), Style::default(), true);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 3);
        assert_eq!(lines[0].spans[1].content, CURSOR_GLYPH);
        let plain = buf.styled_lines(Style::default(), Style::default(), false);
        assert_eq!(plain[0].spans.len(), 1);
    }
}
