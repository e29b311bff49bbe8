/// Caret location as shown in the status bar. Line and column are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
    pub char_count: usize,
}

impl CursorPosition {
    pub fn new(line: usize, column: usize, char_count: usize) -> Self {
        Self {
            line,
            column,
            char_count,
        }
    }
}
