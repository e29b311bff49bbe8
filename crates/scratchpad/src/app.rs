use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use crate::command::{command_for_key, Command};
use crate::config::{Appearance, Config};
use crate::document::{Document, SaveState};
use crate::error::ImportError;
use crate::file_io::{FileIo, IoEvent};
use crate::status::StatusLine;
use crate::ui_state::{FindField, Mode, PathPurpose, UIState};
use crate::web_importer::WebImporter;

const APP_NAME: &str = "Scratchpad";

/// An operation that discards the current document and so must pass the
/// unsaved-changes prompt first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    New,
    Open(PathBuf),
    Import(String),
    Exit,
}

/// Answer to the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

/// The editor shell: owns the document and drives every user-visible state change.
pub struct App {
    pub document: Document,
    pub config: Config,
    pub appearance: Appearance,
    pub ui_state: UIState,
    file_io: FileIo,
    importer: WebImporter,
    /// Waiting on the unsaved-changes prompt
    pending: Option<PendingAction>,
    /// Run once the save of the given revision completes
    after_save: Option<(u64, PendingAction)>,
    /// Chosen Save on an unnamed document; waiting for a Save As path
    save_as_then: Option<PendingAction>,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        let appearance = config.resolve_appearance().await;
        log::info!("Using theme '{}'", appearance.theme.name);
        Ok(Self::with_config(config, appearance))
    }

    /// Build the shell from already-resolved configuration. Needs a tokio runtime.
    pub fn with_config(config: Config, appearance: Appearance) -> Self {
        let mut document = Document::new();
        document
            .buffer_mut()
            .set_tab_config(config.editor.tab_size, config.editor.use_spaces);

        Self {
            document,
            config,
            appearance,
            ui_state: UIState::new(),
            file_io: FileIo::spawn(),
            importer: WebImporter::new(),
            pending: None,
            after_save: None,
            save_as_then: None,
        }
    }

    pub fn with_importer(mut self, importer: WebImporter) -> Self {
        self.importer = importer;
        self
    }

    // ---- accessors ----

    pub fn title(&self) -> String {
        format!("{} - {}", APP_NAME, self.document.display_name())
    }

    pub fn status_line(&self) -> StatusLine<'static> {
        StatusLine {
            cursor: self.document.buffer().cursor_position(),
            encoding: self.document.encoding(),
            modified: self.document.is_modified(),
        }
    }

    pub fn state(&self) -> SaveState {
        self.document.state()
    }

    pub fn is_modified(&self) -> bool {
        self.document.is_modified()
    }

    pub fn mode(&self) -> Mode {
        self.ui_state.mode()
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.ui_state.should_quit()
    }

    pub fn update_status(&mut self) {
        self.ui_state.status.update();
    }

    // ---- key handling ----

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.ui_state.mode() {
            Mode::Editing => {
                if let Some(command) = command_for_key(key) {
                    self.execute(command).await?;
                }
            }
            Mode::Help => self.ui_state.toggle_help(),
            Mode::FindReplace => self.handle_find_replace_key(key),
            Mode::ImportUrl => self.handle_url_key(key).await?,
            Mode::PathPrompt(purpose) => self.handle_path_key(purpose, key).await?,
            Mode::UnsavedPrompt => self.handle_unsaved_key(key).await?,
        }
        Ok(())
    }

    fn handle_find_replace_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.ui_state.enter_editing(),
            KeyCode::Tab | KeyCode::BackTab => self.ui_state.find_replace.toggle_focus(),
            KeyCode::Enter => self.find_next(),
            KeyCode::Char('r') if ctrl => self.replace(),
            KeyCode::Char('e') if ctrl => self.replace_all(),
            KeyCode::Backspace => {
                self.ui_state.find_replace.focused_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.ui_state.find_replace.focused_mut().push(c),
            _ => {}
        }
    }

    async fn handle_url_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.ui_state.enter_editing(),
            KeyCode::Enter => {
                let url = self.ui_state.input.clone();
                self.submit_import_url(&url).await?;
            }
            KeyCode::Backspace => self.ui_state.pop_input(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui_state.push_input(c)
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_path_key(&mut self, purpose: PathPurpose, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.ui_state.enter_editing();
                if purpose == PathPurpose::SaveAs && self.save_as_then.take().is_some() {
                    self.ui_state.status.info("Cancelled");
                }
            }
            KeyCode::Enter => {
                let input = self.ui_state.input.clone();
                self.submit_path(purpose, &input).await?;
            }
            KeyCode::Backspace => self.ui_state.pop_input(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui_state.push_input(c)
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_unsaved_key(&mut self, key: KeyEvent) -> Result<()> {
        let choice = match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => UnsavedChoice::Save,
            KeyCode::Char('d') | KeyCode::Char('D') => UnsavedChoice::Discard,
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => UnsavedChoice::Cancel,
            _ => return Ok(()),
        };
        self.resolve_unsaved(choice).await
    }

    // ---- commands ----

    pub async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::New => self.request(PendingAction::New).await?,
            Command::Open => self.ui_state.open_path_prompt(PathPurpose::Open, None),
            Command::Save => self.save(),
            Command::SaveAs => self.prompt_save_as(),
            Command::ImportFromWeb => self.ui_state.open_url_prompt(),
            Command::Exit => self.request(PendingAction::Exit).await?,
            Command::Undo => {
                if !self.document.edit(|b| b.undo()) {
                    self.ui_state.status.info("Nothing to undo");
                }
            }
            Command::Redo => {
                if !self.document.edit(|b| b.redo()) {
                    self.ui_state.status.info("Nothing to redo");
                }
            }
            Command::Cut => {
                self.document.edit(|b| b.cut());
            }
            Command::Copy => {
                self.document.buffer_mut().copy();
            }
            Command::Paste => {
                self.document.edit(|b| b.paste());
            }
            Command::SelectAll => self.document.buffer_mut().select_all(),
            Command::FindReplace => {
                let selected = self.document.buffer().selected_text();
                self.ui_state.open_find_replace(selected);
            }
            Command::Help => self.ui_state.toggle_help(),
            Command::InsertChar(c) => {
                self.document.edit(|b| b.insert_char(c));
            }
            Command::InsertNewline => {
                self.document.edit(|b| b.insert_newline());
            }
            Command::InsertTab => {
                self.document.edit(|b| b.insert_tab());
            }
            Command::DeleteBackward => {
                self.document.edit(|b| b.delete_char_backward());
            }
            Command::DeleteForward => {
                self.document.edit(|b| b.delete_char_forward());
            }
            Command::MoveLeft(extend) => self.document.buffer_mut().move_left(extend),
            Command::MoveRight(extend) => self.document.buffer_mut().move_right(extend),
            Command::MoveUp(extend) => self.document.buffer_mut().move_up(extend),
            Command::MoveDown(extend) => self.document.buffer_mut().move_down(extend),
            Command::LineStart(extend) => self.document.buffer_mut().move_to_line_start(extend),
            Command::LineEnd(extend) => self.document.buffer_mut().move_to_line_end(extend),
            Command::PageUp(extend) => self.document.buffer_mut().page_up(extend),
            Command::PageDown(extend) => self.document.buffer_mut().page_down(extend),
        }
        Ok(())
    }

    // ---- unsaved-changes state machine ----

    /// Run `action` now if the document is clean, otherwise ask first.
    pub async fn request(&mut self, action: PendingAction) -> Result<()> {
        if !self.document.is_modified() {
            return self.perform(action).await;
        }

        log::debug!("Unsaved changes; prompting before {:?}", action);
        self.pending = Some(action);
        self.ui_state.set_mode(Mode::UnsavedPrompt);
        self.ui_state
            .status
            .warning("You have unsaved changes. What would you like to do?");
        Ok(())
    }

    pub async fn resolve_unsaved(&mut self, choice: UnsavedChoice) -> Result<()> {
        let Some(action) = self.pending.take() else {
            self.ui_state.enter_editing();
            return Ok(());
        };
        self.ui_state.enter_editing();

        match choice {
            UnsavedChoice::Cancel => {
                log::debug!("Cancelled {:?}", action);
                self.ui_state.status.info("Cancelled");
            }
            UnsavedChoice::Discard => {
                log::info!("Discarding unsaved changes for {:?}", action);
                self.perform(action).await?;
            }
            UnsavedChoice::Save => match self.document.path().map(|p| p.to_path_buf()) {
                Some(path) => {
                    let revision = self.queue_save(path);
                    self.after_save = Some((revision, action));
                }
                None => {
                    self.save_as_then = Some(action);
                    self.prompt_save_as();
                }
            },
        }
        Ok(())
    }

    async fn perform(&mut self, action: PendingAction) -> Result<()> {
        match action {
            PendingAction::New => {
                self.document.reset();
                self.ui_state.status.info("New document");
            }
            PendingAction::Open(path) => {
                self.ui_state
                    .status
                    .info(format!("Opening {}...", path.display()));
                self.file_io.load(path, self.document.revision());
            }
            PendingAction::Import(url) => {
                let result = self.importer.import(&url).await;
                self.finish_import(&url, result);
            }
            PendingAction::Exit => {
                log::info!("Application shutdown requested");
                self.ui_state.quit();
            }
        }
        Ok(())
    }

    // ---- file operations ----

    /// Save to the current path, or ask for one if the document is unnamed.
    pub fn save(&mut self) {
        match self.document.path().map(|p| p.to_path_buf()) {
            Some(path) => {
                self.queue_save(path);
            }
            None => self.prompt_save_as(),
        }
    }

    pub fn save_as(&mut self, path: PathBuf) {
        let revision = self.queue_save(path);
        if let Some(action) = self.save_as_then.take() {
            self.after_save = Some((revision, action));
        }
    }

    fn prompt_save_as(&mut self) {
        let initial = self
            .document
            .path()
            .map(|p| p.display().to_string());
        self.ui_state.open_path_prompt(PathPurpose::SaveAs, initial);
    }

    fn queue_save(&mut self, path: PathBuf) -> u64 {
        let request = self.document.save_request(path);
        let revision = request.revision;
        self.ui_state
            .status
            .info(format!("Saving {}...", request.path.display()));
        self.file_io.save(request);
        revision
    }

    async fn submit_path(&mut self, purpose: PathPurpose, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            self.ui_state.input_error = Some("Please enter a file name.".to_string());
            return Ok(());
        }

        let path = PathBuf::from(input);
        self.ui_state.enter_editing();
        match purpose {
            PathPurpose::Open => self.request(PendingAction::Open(path)).await?,
            PathPurpose::SaveAs => self.save_as(path),
        }
        Ok(())
    }

    /// Drain completed file operations without blocking.
    pub async fn poll_io(&mut self) -> Result<()> {
        while let Some(event) = self.file_io.try_next_event() {
            self.apply_io_event(event).await?;
        }
        Ok(())
    }

    /// Wait for the next file operation to finish and apply it.
    /// Returns `false` when nothing was in flight.
    pub async fn process_next_io_event(&mut self) -> Result<bool> {
        match self.file_io.next_event().await {
            Some(event) => {
                self.apply_io_event(event).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_io_event(&mut self, event: IoEvent) -> Result<()> {
        match event {
            IoEvent::Loaded {
                path,
                revision,
                result,
            } => match result {
                Ok(_) if revision != self.document.revision() && self.document.is_modified() => {
                    // Edited while the file was being read; ask before replacing
                    log::info!(
                        "Document changed while loading '{}'; prompting",
                        path.display()
                    );
                    self.request(PendingAction::Open(path)).await?;
                }
                Ok(content) => {
                    self.document.replace(Some(path), content, false);
                    self.ui_state
                        .status
                        .success(format!("Opened {}", self.document.display_name()));
                }
                Err(e) => {
                    log::error!("Failed to load '{}': {}", path.display(), e);
                    self.ui_state.status.error(format!("Error reading file: {}", e));
                }
            },
            IoEvent::Saved {
                path,
                revision,
                result,
            } => match result {
                Ok(()) => {
                    let message = format!("Saved {}", path.display());
                    if !self.document.mark_saved(path, revision) {
                        log::debug!(
                            "Save of revision {} finished after the document was replaced",
                            revision
                        );
                    }
                    self.ui_state.status.success(message);

                    let follow_up = match self.after_save.take() {
                        Some((awaited, action)) if awaited == revision => Some(action),
                        other => {
                            self.after_save = other;
                            None
                        }
                    };
                    if let Some(action) = follow_up {
                        // Re-check: the document may have been edited during the write
                        self.request(action).await?;
                    }
                }
                Err(e) => {
                    log::error!("Failed to save '{}': {}", path.display(), e);
                    if self.after_save.take().is_some() {
                        log::info!("Pending operation aborted after failed save");
                    }
                    self.ui_state.status.error(format!("Failed to save file: {}", e));
                }
            },
        }
        Ok(())
    }

    // ---- web import ----

    async fn submit_import_url(&mut self, input: &str) -> Result<()> {
        let url = input.trim().to_string();
        if !WebImporter::validate(&url) {
            self.ui_state.input_error = Some("Please enter a valid HTTPS URL.".to_string());
            return Ok(());
        }
        self.ui_state.enter_editing();
        self.request(PendingAction::Import(url)).await
    }

    fn finish_import(&mut self, url: &str, result: Result<String, ImportError>) {
        match result {
            Ok(body) => {
                // Imported text exists nowhere on disk, so it starts out unsaved
                self.document.replace(None, body, true);
                self.ui_state.status.success(format!("Imported {}", url));
            }
            Err(ImportError::Validation(e)) => {
                self.ui_state.status.warning(e.to_string());
            }
            Err(ImportError::Fetch(e)) => {
                log::error!("Import from {} failed: {}", url, e);
                self.ui_state
                    .status
                    .error(format!("Failed to fetch content: {}", e));
            }
        }
    }

    // ---- find and replace ----

    pub fn find_next(&mut self) {
        let needle = self.ui_state.find_replace.find.clone();
        if needle.is_empty() {
            return;
        }

        let text = self.document.text();
        let origin = self.document.buffer().search_origin();
        match padcore::find_next(&text, &needle, origin) {
            Some(span) => {
                if span.start < origin {
                    self.ui_state.status.info("Search wrapped to the top");
                }
                self.document
                    .buffer_mut()
                    .select_byte_range(span.start, span.end());
            }
            None => {
                self.ui_state.status.info("No more occurrences found.");
            }
        }
    }

    /// Replace the first occurrence in the document (not the one at the caret).
    pub fn replace(&mut self) {
        let Some((needle, replacement)) = self.replace_terms() else {
            return;
        };
        let (text, count) = padcore::replace_one(&self.document.text(), &needle, &replacement);
        self.apply_replacement(text, count);
    }

    pub fn replace_all(&mut self) {
        let Some((needle, replacement)) = self.replace_terms() else {
            return;
        };
        let (text, count) = padcore::replace_all(&self.document.text(), &needle, &replacement);
        self.apply_replacement(text, count);
    }

    /// Both fields must be filled in for a replacement to run.
    fn replace_terms(&self) -> Option<(String, String)> {
        let state = &self.ui_state.find_replace;
        if state.find.is_empty() || state.replace.is_empty() {
            return None;
        }
        Some((state.find.clone(), state.replace.clone()))
    }

    fn apply_replacement(&mut self, text: String, count: usize) {
        if count == 0 {
            self.ui_state.status.info("No occurrences found.");
            return;
        }
        self.document.edit(|b| b.replace_content(&text));
        let noun = if count == 1 { "occurrence" } else { "occurrences" };
        self.ui_state
            .status
            .success(format!("Replaced {} {}", count, noun));
    }

    pub fn focused_find_field(&self) -> FindField {
        self.ui_state.find_replace.focus
    }
}
