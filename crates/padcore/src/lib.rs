pub mod cursor;
pub mod find_replace;
pub mod url;

pub use cursor::CursorPosition;
pub use find_replace::{count_matches, find_next, replace_all, replace_one, MatchSpan};
pub use url::is_valid_https_url;
