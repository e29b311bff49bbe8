use std::path::{Path, PathBuf};

use crate::editor::Editor;
use crate::file_io::SaveRequest;

pub const ENCODING: &str = "UTF-8";
pub const UNNAMED: &str = "Unnamed";

/// Whether the document has edits that are not on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Clean,
    Dirty,
}

/// The open document: its text buffer, where it lives and whether it is saved.
///
/// `modified` is set and cleared only here, in response to edits and
/// completed saves, never by the buffer itself.
pub struct Document {
    path: Option<PathBuf>,
    buffer: Editor,
    modified: bool,
    revision: u64,
    /// Revision at which the text was last swapped out wholesale
    replaced_at: u64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            path: None,
            buffer: Editor::new(),
            modified: false,
            revision: 0,
            replaced_at: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNNAMED.to_string())
    }

    pub fn encoding(&self) -> &'static str {
        ENCODING
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn state(&self) -> SaveState {
        if self.modified {
            SaveState::Dirty
        } else {
            SaveState::Clean
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> String {
        self.buffer.content()
    }

    pub fn buffer(&self) -> &Editor {
        &self.buffer
    }

    /// Mutable access to the buffer for caret and selection changes.
    ///
    /// Text changes must go through [`Document::edit`] so they mark the document.
    pub fn buffer_mut(&mut self) -> &mut Editor {
        &mut self.buffer
    }

    /// Run an edit against the buffer; a `true` result marks the document dirty.
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Editor) -> bool,
    {
        let changed = f(&mut self.buffer);
        if changed {
            self.modified = true;
            self.revision += 1;
        }
        changed
    }

    /// Start over with an empty, unnamed, clean document.
    pub fn reset(&mut self) {
        self.replace(None, String::new(), false);
    }

    /// Swap in a whole new text, e.g. after a load or an import.
    pub fn replace(&mut self, path: Option<PathBuf>, text: String, modified: bool) {
        self.buffer.set_content(text);
        self.path = path;
        self.modified = modified;
        self.revision += 1;
        self.replaced_at = self.revision;
    }

    /// Snapshot the text for writing to `path`.
    pub fn save_request(&self, path: PathBuf) -> SaveRequest {
        SaveRequest {
            path,
            content: self.buffer.content(),
            revision: self.revision,
        }
    }

    /// Record a successful write of `revision` to `path`.
    ///
    /// Returns `false` when the write belonged to a document that has since
    /// been replaced; nothing changes in that case. The document stays dirty
    /// if it was edited while the write was in flight.
    pub fn mark_saved(&mut self, path: PathBuf, revision: u64) -> bool {
        if revision < self.replaced_at {
            return false;
        }
        self.path = Some(path);
        self.modified = self.revision != revision;
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
