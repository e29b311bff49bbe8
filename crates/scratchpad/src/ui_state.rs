use crate::status::StatusManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPurpose {
    Open,
    SaveAs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editing,
    Help,
    FindReplace,
    ImportUrl,
    PathPrompt(PathPurpose),
    UnsavedPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindField {
    Find,
    Replace,
}

/// Contents of the Find and Replace overlay. Kept between openings.
#[derive(Debug, Clone)]
pub struct FindReplaceState {
    pub find: String,
    pub replace: String,
    pub focus: FindField,
}

impl FindReplaceState {
    fn new() -> Self {
        Self {
            find: String::new(),
            replace: String::new(),
            focus: FindField::Find,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FindField::Find => FindField::Replace,
            FindField::Replace => FindField::Find,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FindField::Find => &mut self.find,
            FindField::Replace => &mut self.replace,
        }
    }
}

pub struct UIState {
    pub mode: Mode,
    pub status: StatusManager,
    pub find_replace: FindReplaceState,
    /// Single-line input shared by the URL and path prompts
    pub input: String,
    /// Validation message shown inside the active prompt
    pub input_error: Option<String>,
    pub should_quit: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Editing,
            status: StatusManager::new(),
            find_replace: FindReplaceState::new(),
            input: String::new(),
            input_error: None,
            should_quit: false,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn enter_editing(&mut self) {
        self.mode = Mode::Editing;
        self.input.clear();
        self.input_error = None;
    }

    pub fn toggle_help(&mut self) {
        self.mode = if self.mode == Mode::Help {
            Mode::Editing
        } else {
            Mode::Help
        };
    }

    pub fn open_find_replace(&mut self, initial: Option<String>) {
        if let Some(text) = initial.filter(|t| !t.is_empty() && !t.contains('\n')) {
            self.find_replace.find = text;
        }
        self.find_replace.focus = FindField::Find;
        self.mode = Mode::FindReplace;
    }

    pub fn open_url_prompt(&mut self) {
        self.input.clear();
        self.input_error = None;
        self.mode = Mode::ImportUrl;
    }

    pub fn open_path_prompt(&mut self, purpose: PathPurpose, initial: Option<String>) {
        self.input = initial.unwrap_or_default();
        self.input_error = None;
        self.mode = Mode::PathPrompt(purpose);
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
        self.input_error = None;
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
        self.input_error = None;
    }

    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_state_creation() {
        let state = UIState::new();
        assert_eq!(state.mode(), Mode::Editing);
        assert!(state.input.is_empty());
        assert!(!state.should_quit());
    }

    #[test]
    fn test_help_toggle() {
        let mut state = UIState::new();
        state.toggle_help();
        assert_eq!(state.mode(), Mode::Help);
        state.toggle_help();
        assert_eq!(state.mode(), Mode::Editing);
    }

    #[test]
    fn test_find_replace_prefill_and_focus() {
        let mut state = UIState::new();
        state.open_find_replace(Some("needle".into()));
        assert_eq!(state.mode(), Mode::FindReplace);
        assert_eq!(state.find_replace.find, "needle");

        // Multi-line selections are not used as the search term
        state.open_find_replace(Some("a\nb".into()));
        assert_eq!(state.find_replace.find, "needle");

        state.find_replace.toggle_focus();
        state.find_replace.focused_mut().push_str("thread");
        assert_eq!(state.find_replace.replace, "thread");
    }

    #[test]
    fn test_prompt_input_editing() {
        let mut state = UIState::new();
        state.open_path_prompt(PathPurpose::SaveAs, Some("notes.txt".into()));
        assert_eq!(state.mode(), Mode::PathPrompt(PathPurpose::SaveAs));

        state.input_error = Some("bad".into());
        state.pop_input();
        state.push_input('s');
        assert_eq!(state.input, "notes.txs");
        assert!(state.input_error.is_none());

        assert_eq!(state.take_input(), "notes.txs");
        state.enter_editing();
        assert_eq!(state.mode(), Mode::Editing);
        assert!(state.input.is_empty());
    }

    #[test]
    fn test_quit_operations() {
        let mut state = UIState::new();
        assert!(!state.should_quit());
        state.quit();
        assert!(state.should_quit());
    }
}
