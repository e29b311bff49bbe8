use padcore::CursorPosition;
use ropey::Rope;
use std::cmp;

const HISTORY_LIMIT: usize = 100;

/// The editable text of the open document plus caret, selection and history.
///
/// Every method that changes the text returns `true` when it did so. The
/// buffer does not track whether the document is saved; that is owned by
/// [`crate::document::Document`].
#[derive(Clone)]
pub struct Editor {
    rope: Rope,
    // Caret and selection anchor are char indices into the rope
    caret: usize,
    anchor: Option<usize>,
    preferred_col: Option<usize>,
    viewport_offset: usize,
    viewport_height: usize,
    clipboard: String,
    // Undo/Redo support
    history: Vec<EditorState>,
    history_index: usize,
    tab_size: usize,
    use_spaces: bool,
}

#[derive(Clone)]
struct EditorState {
    content: String,
    caret: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            caret: 0,
            anchor: None,
            preferred_col: None,
            viewport_offset: 0,
            viewport_height: 24, // Default, updated on draw
            clipboard: String::new(),
            history: vec![EditorState {
                content: String::new(),
                caret: 0,
            }],
            history_index: 0,
            tab_size: 4,
            use_spaces: true,
        }
    }

    /// Replace the whole text, resetting caret, selection and history.
    pub fn set_content(&mut self, content: String) {
        self.rope = Rope::from_str(&content);
        self.caret = 0;
        self.anchor = None;
        self.preferred_col = None;
        self.viewport_offset = 0;
        self.history = vec![EditorState { content, caret: 0 }];
        self.history_index = 0;
    }

    /// Replace the whole text as an undoable edit, keeping the caret where possible.
    pub fn replace_content(&mut self, content: &str) -> bool {
        if self.rope.len_bytes() == content.len() && self.rope.to_string() == content {
            return false;
        }
        let caret = self.caret;
        self.rope = Rope::from_str(content);
        self.caret = caret.min(self.rope.len_chars());
        self.anchor = None;
        self.after_edit();
        true
    }

    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    pub fn set_tab_config(&mut self, tab_size: usize, use_spaces: bool) {
        self.tab_size = tab_size;
        self.use_spaces = use_spaces;
    }

    // ---- caret and selection ----

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Zero-based (line, char column) of the caret.
    pub fn caret_line_col(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.caret);
        (line, self.caret - self.rope.line_to_char(line))
    }

    pub fn cursor_position(&self) -> CursorPosition {
        let (line, col) = self.caret_line_col();
        CursorPosition::new(line + 1, col + 1, self.rope.len_chars())
    }

    /// Selected char range, ordered start..end.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.caret {
            return None;
        }
        Some((cmp::min(anchor, self.caret), cmp::max(anchor, self.caret)))
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection()
            .map(|(start, end)| self.rope.slice(start..end).to_string())
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.caret = self.rope.len_chars();
        self.adjust_viewport();
    }

    /// Select a byte range of the current text, e.g. a search hit.
    pub fn select_byte_range(&mut self, start: usize, end: usize) {
        let len = self.rope.len_bytes();
        let start = self.rope.byte_to_char(start.min(len));
        let end = self.rope.byte_to_char(end.min(len));
        self.anchor = Some(start);
        self.caret = end;
        self.preferred_col = None;
        self.adjust_viewport();
    }

    /// Byte offset a forward search should start from: the end of the
    /// selection, or the caret.
    pub fn search_origin(&self) -> usize {
        let origin = self.selection().map_or(self.caret, |(_, end)| end);
        self.rope.char_to_byte(origin)
    }

    // ---- editing ----

    pub fn insert_char(&mut self, c: char) -> bool {
        self.delete_selection_inner();
        self.rope.insert_char(self.caret, c);
        self.caret += 1;
        self.after_edit();
        true
    }

    pub fn insert_str(&mut self, text: &str) -> bool {
        let had_selection = self.delete_selection_inner();
        if text.is_empty() {
            if had_selection {
                self.after_edit();
            }
            return had_selection;
        }
        self.rope.insert(self.caret, text);
        self.caret += text.chars().count();
        self.after_edit();
        true
    }

    pub fn insert_newline(&mut self) -> bool {
        self.insert_char('\n')
    }

    pub fn insert_tab(&mut self) -> bool {
        if self.use_spaces {
            let spaces = " ".repeat(self.tab_size);
            self.insert_str(&spaces)
        } else {
            self.insert_char('\t')
        }
    }

    pub fn delete_char_backward(&mut self) -> bool {
        if self.delete_selection_inner() {
            self.after_edit();
            return true;
        }
        if self.caret == 0 {
            return false;
        }
        self.rope.remove(self.caret - 1..self.caret);
        self.caret -= 1;
        self.after_edit();
        true
    }

    pub fn delete_char_forward(&mut self) -> bool {
        if self.delete_selection_inner() {
            self.after_edit();
            return true;
        }
        if self.caret >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(self.caret..self.caret + 1);
        self.after_edit();
        true
    }

    pub fn copy(&mut self) -> bool {
        match self.selected_text() {
            Some(text) => {
                self.clipboard = text;
                true
            }
            None => false,
        }
    }

    pub fn cut(&mut self) -> bool {
        if !self.copy() {
            return false;
        }
        self.delete_selection_inner();
        self.after_edit();
        true
    }

    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() {
            return false;
        }
        let text = self.clipboard.clone();
        self.insert_str(&text)
    }

    // ---- undo / redo ----

    pub fn undo(&mut self) -> bool {
        if self.history_index == 0 {
            return false;
        }
        self.history_index -= 1;
        self.restore_history_state();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.history_index + 1 >= self.history.len() {
            return false;
        }
        self.history_index += 1;
        self.restore_history_state();
        true
    }

    fn restore_history_state(&mut self) {
        let state = &self.history[self.history_index];
        self.rope = Rope::from_str(&state.content);
        self.caret = state.caret.min(self.rope.len_chars());
        self.anchor = None;
        self.preferred_col = None;
        self.adjust_viewport();
    }

    fn save_state(&mut self) {
        let content = self.rope.to_string();
        if let Some(last) = self.history.get(self.history_index) {
            if last.content == content {
                return;
            }
        }

        self.history.truncate(self.history_index + 1);
        self.history.push(EditorState {
            content,
            caret: self.caret,
        });
        self.history_index += 1;

        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
            self.history_index -= 1;
        }
    }

    // ---- movement ----

    pub fn move_left(&mut self, extend: bool) {
        if !extend {
            if let Some((start, _)) = self.selection() {
                self.anchor = None;
                self.caret = start;
                return;
            }
        }
        self.begin_move(extend);
        self.caret = self.caret.saturating_sub(1);
        self.adjust_viewport();
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend {
            if let Some((_, end)) = self.selection() {
                self.anchor = None;
                self.caret = end;
                return;
            }
        }
        self.begin_move(extend);
        self.caret = cmp::min(self.caret + 1, self.rope.len_chars());
        self.adjust_viewport();
    }

    pub fn move_up(&mut self, extend: bool) {
        let (line, col) = self.caret_line_col();
        if line > 0 {
            self.move_vertically(line - 1, col, extend);
        }
    }

    pub fn move_down(&mut self, extend: bool) {
        let (line, col) = self.caret_line_col();
        if line + 1 < self.rope.len_lines() {
            self.move_vertically(line + 1, col, extend);
        }
    }

    pub fn move_to_line_start(&mut self, extend: bool) {
        self.begin_move(extend);
        let (line, _) = self.caret_line_col();
        self.caret = self.rope.line_to_char(line);
    }

    pub fn move_to_line_end(&mut self, extend: bool) {
        self.begin_move(extend);
        let (line, _) = self.caret_line_col();
        self.caret = self.rope.line_to_char(line) + self.line_len(line);
    }

    pub fn page_up(&mut self, extend: bool) {
        let (line, col) = self.caret_line_col();
        let target = line.saturating_sub(self.viewport_height);
        self.move_vertically(target, col, extend);
    }

    pub fn page_down(&mut self, extend: bool) {
        let (line, col) = self.caret_line_col();
        let max_line = self.rope.len_lines().saturating_sub(1);
        let target = cmp::min(line + self.viewport_height, max_line);
        self.move_vertically(target, col, extend);
    }

    fn move_vertically(&mut self, target_line: usize, col: usize, extend: bool) {
        let preferred = self.preferred_col.unwrap_or(col);
        self.begin_move(extend);
        let col = cmp::min(preferred, self.line_len(target_line));
        self.caret = self.rope.line_to_char(target_line) + col;
        self.preferred_col = Some(preferred);
        self.adjust_viewport();
    }

    fn begin_move(&mut self, extend: bool) {
        self.preferred_col = None;
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.caret);
            }
        } else {
            self.anchor = None;
        }
    }

    // ---- viewport ----

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.adjust_viewport();
    }

    pub fn viewport_offset(&self) -> usize {
        self.viewport_offset
    }

    /// Lines currently in view, without their line terminators.
    pub fn viewport_lines(&self) -> Vec<String> {
        let end_line = cmp::min(
            self.viewport_offset + self.viewport_height,
            self.rope.len_lines(),
        );

        (self.viewport_offset..end_line)
            .filter_map(|i| self.rope.get_line(i))
            .map(|line| {
                line.to_string()
                    .trim_end_matches(|c: char| c == '\n' || c == '\r')
                    .to_string()
            })
            .collect()
    }

    /// Char index at which `line` starts.
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line)
    }

    fn adjust_viewport(&mut self) {
        let line = self.rope.char_to_line(self.caret);
        if line < self.viewport_offset {
            self.viewport_offset = line;
        } else if line >= self.viewport_offset + self.viewport_height {
            self.viewport_offset = line + 1 - self.viewport_height;
        }
    }

    // ---- helpers ----

    /// Length of `line` in chars, excluding its line break.
    fn line_len(&self, line: usize) -> usize {
        match self.rope.get_line(line) {
            Some(slice) => {
                let mut len = slice.len_chars();
                if len > 0 && slice.char(len - 1) == '\n' {
                    len -= 1;
                    if len > 0 && slice.char(len - 1) == '\r' {
                        len -= 1;
                    }
                }
                len
            }
            None => 0,
        }
    }

    fn delete_selection_inner(&mut self) -> bool {
        match self.selection() {
            Some((start, end)) => {
                self.rope.remove(start..end);
                self.caret = start;
                self.anchor = None;
                true
            }
            None => {
                self.anchor = None;
                false
            }
        }
    }

    fn after_edit(&mut self) {
        self.preferred_col = None;
        self.adjust_viewport();
        self.save_state();
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_creation() {
        let editor = Editor::new();
        assert_eq!(editor.caret(), 0);
        assert_eq!(editor.rope.len_lines(), 1); // Empty editor has one empty line
        assert_eq!(editor.cursor_position(), CursorPosition::new(1, 1, 0));
    }

    #[test]
    fn test_text_insertion() {
        let mut editor = Editor::new();
        assert!(editor.insert_char('H'));
        assert!(editor.insert_char('i'));

        assert_eq!(editor.content(), "Hi");
        assert_eq!(editor.cursor_position(), CursorPosition::new(1, 3, 2));
    }

    #[test]
    fn test_newline_insertion() {
        let mut editor = Editor::new();
        editor.insert_char('H');
        editor.insert_char('i');
        editor.insert_newline();
        editor.insert_char('!');

        assert_eq!(editor.content(), "Hi\n!");
        assert_eq!(editor.caret_line_col(), (1, 1));
        assert_eq!(editor.rope.len_lines(), 2);
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut editor = Editor::new();
        editor.set_content("abc".to_string());
        assert!(!editor.delete_char_backward()); // at start

        editor.move_to_line_end(false);
        assert!(editor.delete_char_backward());
        assert_eq!(editor.content(), "ab");
        assert!(!editor.delete_char_forward()); // at end

        editor.move_to_line_start(false);
        assert!(editor.delete_char_forward());
        assert_eq!(editor.content(), "b");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut editor = Editor::new();
        editor.set_content("Hello\nWorld".to_string());
        editor.move_down(false);
        editor.move_to_line_start(false);
        editor.delete_char_backward();
        assert_eq!(editor.content(), "HelloWorld");
        assert_eq!(editor.caret_line_col(), (0, 5));
    }

    #[test]
    fn test_cursor_movement() {
        let mut editor = Editor::new();
        editor.set_content("Hello\nWorld".to_string());

        editor.move_right(false);
        assert_eq!(editor.caret_line_col(), (0, 1));

        editor.move_down(false);
        assert_eq!(editor.caret_line_col(), (1, 1));

        editor.move_left(false);
        assert_eq!(editor.caret_line_col(), (1, 0));

        editor.move_up(false);
        assert_eq!(editor.caret_line_col(), (0, 0));
    }

    #[test]
    fn test_vertical_movement_keeps_preferred_column() {
        let mut editor = Editor::new();
        editor.set_content("long line\nab\nanother long".to_string());
        editor.move_to_line_end(false);
        editor.move_down(false);
        assert_eq!(editor.caret_line_col(), (1, 2));
        editor.move_down(false);
        assert_eq!(editor.caret_line_col(), (2, 9));
    }

    #[test]
    fn test_line_end_skips_crlf() {
        let mut editor = Editor::new();
        editor.set_content("ab\r\ncd".to_string());
        editor.move_to_line_end(false);
        assert_eq!(editor.caret_line_col(), (0, 2));
    }

    #[test]
    fn test_tab_uses_configured_spaces() {
        let mut editor = Editor::new();
        editor.set_tab_config(2, true);
        editor.insert_tab();
        assert_eq!(editor.content(), "  ");

        editor.set_tab_config(4, false);
        editor.insert_tab();
        assert_eq!(editor.content(), "  \t");
    }

    #[test]
    fn test_selection_cut_copy_paste() {
        let mut editor = Editor::new();
        editor.set_content("Hello World".to_string());

        for _ in 0..5 {
            editor.move_right(true);
        }
        assert_eq!(editor.selected_text().as_deref(), Some("Hello"));

        assert!(editor.copy());
        assert_eq!(editor.content(), "Hello World");

        assert!(editor.cut());
        assert_eq!(editor.content(), " World");
        assert!(editor.selection().is_none());

        editor.move_to_line_end(false);
        assert!(editor.paste());
        assert_eq!(editor.content(), " WorldHello");
    }

    #[test]
    fn test_copy_without_selection_does_nothing() {
        let mut editor = Editor::new();
        editor.set_content("text".to_string());
        assert!(!editor.copy());
        assert!(!editor.cut());
        assert!(!editor.paste());
        assert_eq!(editor.content(), "text");
    }

    #[test]
    fn test_cursor_position_treats_crlf_as_one_break() {
        let mut editor = Editor::new();
        editor.set_content("ab\r\ncd".to_string());
        editor.move_down(false);
        editor.move_to_line_end(false);
        assert_eq!(editor.cursor_position(), CursorPosition::new(2, 3, 6));
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut editor = Editor::new();
        editor.set_content("abc".to_string());
        editor.select_all();
        assert_eq!(editor.selected_text().as_deref(), Some("abc"));
        editor.insert_char('x');
        assert_eq!(editor.content(), "x");
    }

    #[test]
    fn test_select_byte_range_and_search_origin() {
        let mut editor = Editor::new();
        editor.set_content("日本 abc abc".to_string());
        let start = "日本 ".len();
        editor.select_byte_range(start, start + 3);
        assert_eq!(editor.selected_text().as_deref(), Some("abc"));
        assert_eq!(editor.search_origin(), start + 3);
    }

    #[test]
    fn test_replace_content_is_undoable() {
        let mut editor = Editor::new();
        editor.set_content("abcabc".to_string());
        assert!(editor.replace_content("Xabc"));
        assert!(!editor.replace_content("Xabc"));
        assert!(editor.undo());
        assert_eq!(editor.content(), "abcabc");
    }

    #[test]
    fn test_undo_redo_functionality() {
        let mut editor = Editor::new();

        assert!(!editor.undo());
        assert!(!editor.redo());

        editor.insert_char('H');
        editor.insert_char('i');
        assert_eq!(editor.content(), "Hi");

        assert!(editor.undo());
        assert_eq!(editor.content(), "H");

        assert!(editor.redo());
        assert_eq!(editor.content(), "Hi");

        editor.insert_char('!');
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(editor.undo());
        assert_eq!(editor.content(), "");
        assert!(!editor.undo());
    }

    #[test]
    fn test_history_limit() {
        let mut editor = Editor::new();
        for i in 0..110 {
            editor.insert_char((b'a' + (i % 26) as u8) as char);
        }
        assert!(editor.undo());
        assert!(editor.history.len() <= HISTORY_LIMIT);
    }

    #[test]
    fn test_set_content_resets_history() {
        let mut editor = Editor::new();
        editor.insert_char('H');
        editor.set_content("New content".to_string());
        assert!(!editor.undo());

        editor.insert_char('!');
        assert!(editor.undo());
        assert_eq!(editor.content(), "New content");
    }

    #[test]
    fn test_viewport_follows_caret() {
        let mut editor = Editor::new();
        let text: Vec<String> = (1..=50).map(|i| format!("line {i}")).collect();
        editor.set_content(text.join("\n"));
        editor.set_viewport_height(10);

        for _ in 0..15 {
            editor.move_down(false);
        }
        assert_eq!(editor.viewport_offset(), 6);
        let lines = editor.viewport_lines();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[9], "line 16");

        editor.page_up(false);
        assert_eq!(editor.caret_line_col().0, 5);
        assert_eq!(editor.viewport_offset(), 5);
    }

    #[test]
    fn test_multibyte_text() {
        let mut editor = Editor::new();
        editor.set_content("こんにちは".to_string());
        editor.move_to_line_end(false);
        assert_eq!(editor.cursor_position(), CursorPosition::new(1, 6, 5));
        editor.insert_char('!');
        assert_eq!(editor.content(), "こんにちは!");
    }
}
