use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Everything the user can ask the editor to do from the main view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // File
    New,
    Open,
    Save,
    SaveAs,
    ImportFromWeb,
    Exit,
    // Edit
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    FindReplace,
    Help,
    // Text entry
    InsertChar(char),
    InsertNewline,
    InsertTab,
    DeleteBackward,
    DeleteForward,
    // Movement; `true` extends the selection
    MoveLeft(bool),
    MoveRight(bool),
    MoveUp(bool),
    MoveDown(bool),
    LineStart(bool),
    LineEnd(bool),
    PageUp(bool),
    PageDown(bool),
}

/// Map a key press in the main view to a command.
pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl {
        let KeyCode::Char(c) = key.code else {
            return None;
        };
        // Terminals report Ctrl+Shift+S as either 'S' or 's' with SHIFT
        let command = match (c.to_ascii_lowercase(), shift || c.is_ascii_uppercase()) {
            ('n', _) => Command::New,
            ('o', _) => Command::Open,
            ('s', false) => Command::Save,
            ('s', true) => Command::SaveAs,
            ('u', _) => Command::ImportFromWeb,
            ('q', _) => Command::Exit,
            ('z', false) => Command::Undo,
            ('z', true) | ('y', _) => Command::Redo,
            ('x', _) => Command::Cut,
            ('c', _) => Command::Copy,
            ('v', _) => Command::Paste,
            ('a', _) => Command::SelectAll,
            ('f', _) => Command::FindReplace,
            _ => return None,
        };
        return Some(command);
    }

    let command = match key.code {
        KeyCode::F(1) => Command::Help,
        KeyCode::F(12) => Command::SaveAs,
        KeyCode::Char(c) => Command::InsertChar(c),
        KeyCode::Enter => Command::InsertNewline,
        KeyCode::Tab => Command::InsertTab,
        KeyCode::Backspace => Command::DeleteBackward,
        KeyCode::Delete => Command::DeleteForward,
        KeyCode::Left => Command::MoveLeft(shift),
        KeyCode::Right => Command::MoveRight(shift),
        KeyCode::Up => Command::MoveUp(shift),
        KeyCode::Down => Command::MoveDown(shift),
        KeyCode::Home => Command::LineStart(shift),
        KeyCode::End => Command::LineEnd(shift),
        KeyCode::PageUp => Command::PageUp(shift),
        KeyCode::PageDown => Command::PageDown(shift),
        _ => return None,
    };
    Some(command)
}
