/// Plain text buffer with a char-boundary cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TextEditor {
    text: String,
    cursor: usize,
}

impl TextEditor {
    pub(crate) fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Line endings are normalized to `\n`.
    pub(crate) fn insert_str(&mut self, raw: &str) {
        let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert_str(self.cursor, &normalized);
        self.cursor += normalized.len();
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub(crate) fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub(crate) fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub(crate) fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub(crate) fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub(crate) fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub(crate) fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.text[start..self.cursor].chars().count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(prev_start, column);
    }

    pub(crate) fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.text.len() {
            self.cursor = end;
            return;
        }
        let column = self.text[self.line_start(self.cursor)..self.cursor]
            .chars()
            .count();
        self.cursor = self.offset_in_line(end + 1, column);
    }

    /// Cursor as (line, column), both counted in chars.
    pub(crate) fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let column = before[self.line_start(self.cursor)..].chars().count();
        (line, column)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map(|idx| idx + 1).unwrap_or(0)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map(|idx| offset + idx)
            .unwrap_or(self.text.len())
    }

    fn offset_in_line(&self, line_start: usize, column: usize) -> usize {
        let line_end = self.line_end(line_start);
        self.text[line_start..line_end]
            .char_indices()
            .nth(column)
            .map(|(idx, _)| line_start + idx)
            .unwrap_or(line_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_respect_multibyte_chars() {
        let mut editor = TextEditor::default();
        editor.insert_str("橘子");
        editor.insert_char('很');
        editor.move_left();
        editor.backspace();
        assert_eq!(editor.text(), "橘很");
        editor.delete();
        assert_eq!(editor.text(), "橘");
        assert_eq!(editor.cursor_position(), (0, 1));
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let mut editor = TextEditor::default();
        editor.insert_str("a\r\nb\rc");
        assert_eq!(editor.text(), "a\nb\nc");
        assert_eq!(editor.cursor_position(), (2, 1));
    }

    #[test]
    fn vertical_moves_keep_column_when_possible() {
        let mut editor = TextEditor::with_text("abcdef\nxy\nlonger line");
        editor.move_up();
        assert_eq!(editor.cursor_position(), (1, 2));
        editor.move_up();
        assert_eq!(editor.cursor_position(), (0, 2));
        editor.move_end();
        editor.move_down();
        assert_eq!(editor.cursor_position(), (1, 2));
        editor.move_down();
        editor.move_down();
        assert_eq!(editor.cursor_position(), (2, 11));
        editor.move_home();
        assert_eq!(editor.cursor_position(), (2, 0));
    }
}
