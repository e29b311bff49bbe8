// Scratchpad library exports

pub mod app;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod file_io;
pub mod status;
pub mod ui;
pub mod ui_state;
pub mod web_importer;

pub use app::{App, PendingAction, UnsavedChoice};
pub use config::Config;
pub use document::{Document, SaveState};
pub use editor::Editor;
pub use error::{FetchError, ImportError, IoError, ValidationError};
pub use file_io::FileIo;
pub use ui_state::UIState;
pub use web_importer::WebImporter;
