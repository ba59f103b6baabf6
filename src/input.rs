//! Length-limited input box with a character counter.

use unicode_width::UnicodeWidthChar;

/// Default character limit when none is configured.
pub const DEFAULT_INPUT_LIMIT: usize = 350;

/// Rows of text the input box may grow to before it scrolls.
pub const MAX_INPUT_ROWS: u16 = 6;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub struct InputBox {
    text: String,
    cursor: usize,
    limit: usize,
}

impl InputBox {
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            limit,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole text, truncating to the limit.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_count();
        self.update_counter();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
        self.update_counter();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Truncate to the limit and return the counter text ("N / limit").
    pub fn update_counter(&mut self) -> String {
        if self.char_count() > self.limit {
            let byte_pos = char_to_byte_index(&self.text, self.limit);
            self.text.truncate(byte_pos);
            self.cursor = self.cursor.min(self.limit);
        }
        self.counter()
    }

    pub fn counter(&self) -> String {
        format!("{} / {}", self.char_count(), self.limit)
    }

    /// Lay the text out in rows of at most `width` display columns, breaking
    /// on any character. Returns the rows and the cursor as (column, row).
    fn layout(&self, width: u16) -> (Vec<String>, (u16, u16)) {
        let width = width.max(1) as usize;
        let mut rows = vec![String::new()];
        let mut col = 0usize;
        let mut cursor = None;

        for (i, c) in self.text.chars().enumerate() {
            let w = c.width().unwrap_or(0);
            if c != '\n' && col > 0 && col + w > width {
                rows.push(String::new());
                col = 0;
            }
            if i == self.cursor {
                cursor = Some((col, rows.len() - 1));
            }
            if c == '\n' {
                rows.push(String::new());
                col = 0;
                continue;
            }
            if let Some(row) = rows.last_mut() {
                row.push(c);
            }
            col += w;
            if col >= width {
                rows.push(String::new());
                col = 0;
            }
        }

        let (x, y) = cursor.unwrap_or((col, rows.len() - 1));
        (rows, (x.min(u16::MAX as usize) as u16, y.min(u16::MAX as usize) as u16))
    }

    /// The rows drawn for a box of `width` columns.
    pub fn display_rows(&self, width: u16) -> Vec<String> {
        self.layout(width).0
    }

    /// Rows of text needed to show the input at `width` columns, capped at
    /// [`MAX_INPUT_ROWS`].
    pub fn rows(&self, width: u16) -> u16 {
        let rows = self.layout(width).0.len().min(MAX_INPUT_ROWS as usize);
        (rows as u16).max(1)
    }

    /// Cursor position as (column, row) within a box of `width` columns,
    /// before any vertical scrolling.
    pub fn cursor_position(&self, width: u16) -> (u16, u16) {
        self.layout(width).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_input_truncated_to_limit() {
        let mut input = InputBox::new(DEFAULT_INPUT_LIMIT);
        input.set_text(&"x".repeat(500));
        assert_eq!(input.char_count(), 350);
        assert_eq!(input.counter(), "350 / 350");
    }

    #[test]
    fn test_insert_past_limit_is_dropped() {
        let mut input = InputBox::new(3);
        for c in "abcd".chars() {
            input.insert(c);
        }
        assert_eq!(input.text(), "abc");
        assert_eq!(input.cursor(), 3);
        assert_eq!(input.update_counter(), "3 / 3");
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let mut input = InputBox::new(4);
        input.set_text("héllo wörld");
        assert_eq!(input.text(), "héll");
        assert_eq!(input.counter(), "4 / 4");
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut input = InputBox::new(10);
        input.set_text("ac");
        input.move_left();
        input.insert('b');
        assert_eq!(input.text(), "abc");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "bc");
        input.move_end();
        input.backspace();
        assert_eq!(input.text(), "b");
    }

    #[test]
    fn test_rows_grow_and_cap() {
        let mut input = InputBox::new(DEFAULT_INPUT_LIMIT);
        assert_eq!(input.rows(10), 1);
        input.set_text(&"x".repeat(25));
        assert_eq!(input.rows(10), 3);
        input.set_text(&"x".repeat(200));
        assert_eq!(input.rows(10), MAX_INPUT_ROWS);
    }

    #[test]
    fn test_cursor_position_wraps() {
        let mut input = InputBox::new(DEFAULT_INPUT_LIMIT);
        input.set_text("abcdefgh\nxy");
        assert_eq!(input.cursor_position(5), (2, 2));
    }

    #[test]
    fn test_display_rows_match_cursor() {
        let mut input = InputBox::new(DEFAULT_INPUT_LIMIT);
        input.set_text("halo apa kabar");
        assert_eq!(input.display_rows(6), vec!["halo a", "pa kab", "ar"]);
        assert_eq!(input.rows(6), 3);
        assert_eq!(input.cursor_position(6), (2, 2));

        input.move_home();
        assert_eq!(input.cursor_position(6), (0, 0));
    }

    #[test]
    fn test_wide_characters_use_two_columns() {
        let mut input = InputBox::new(DEFAULT_INPUT_LIMIT);
        input.set_text("日本語です");
        assert_eq!(input.display_rows(5), vec!["日本", "語で", "す"]);
        assert_eq!(input.cursor_position(5), (2, 2));
    }
}
