//! UTF-8 safe string slicing used by the renderers and the text editors.
//!
//! Everything here works on character or display-column positions so that
//! command output containing multi-byte or double-width glyphs never causes a
//! slice panic.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Returns a prefix of the string up to `max_chars` characters.
pub fn safe_prefix(s: &str, max_chars: usize) -> &str {
    if s.is_empty() || max_chars == 0 {
        return "";
    }
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncates a string to `max_chars` characters and adds an ellipsis if truncated.
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return String::from("…");
    }
    format!("{}…", safe_prefix(s, max_chars - 1))
}

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Return a slice of the string bounded by display columns rather than raw characters.
/// A double-width glyph that would straddle either edge is left out.
pub fn window_by_columns(s: &str, start_cols: usize, width_cols: usize) -> &str {
    if width_cols == 0 || s.is_empty() {
        return "";
    }

    let mut col = 0usize;
    let mut start_byte = None;
    let mut end_byte = s.len();
    let target_end = start_cols.saturating_add(width_cols);

    for (idx, ch) in s.char_indices() {
        let glyph_width = UnicodeWidthChar::width(ch).unwrap_or(0).max(1);
        let next_col = col.saturating_add(glyph_width);

        if start_byte.is_none() && col <= start_cols && start_cols < next_col {
            start_byte = Some(idx);
        }
        if start_byte.is_some() && next_col > target_end {
            end_byte = idx;
            break;
        }
        col = next_col;
    }

    match start_byte {
        Some(start) if start <= end_byte => &s[start..end_byte],
        _ => "",
    }
}

/// Fit a line into `max_cols` display columns, ending with `…` when cut.
pub fn truncate_to_width(s: &str, max_cols: usize) -> String {
    if display_width(s) <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }
    format!("{}…", window_by_columns(s, 0, max_cols - 1))
}

/// Byte offset of the `char_idx`-th character, or the string length past the end.
pub fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Counts the number of characters in a string (not bytes).
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}
