use std::path::PathBuf;
use thiserror::Error;

/// Read or write failure for a document file.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("file is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(PathBuf),

    #[error("{}: {source}", path.display())]
    Other {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => IoError::PermissionDenied(path),
            std::io::ErrorKind::InvalidData => IoError::InvalidUtf8(path),
            _ => IoError::Other { path, source: err },
        }
    }
}

/// Network, TLS or HTTP status failure while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Input rejected before any network call.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("not a valid HTTPS URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_io_error_kinds_are_mapped() {
        let path = PathBuf::from("notes.txt");
        let not_found = IoError::from_io(path.clone(), ErrorKind::NotFound.into());
        assert!(matches!(not_found, IoError::NotFound(_)));

        let denied = IoError::from_io(path.clone(), ErrorKind::PermissionDenied.into());
        assert!(matches!(denied, IoError::PermissionDenied(_)));

        let other = IoError::from_io(path, ErrorKind::WriteZero.into());
        assert!(matches!(other, IoError::Other { .. }));
    }

    #[test]
    fn test_messages_name_the_path() {
        let err = IoError::NotFound(PathBuf::from("/tmp/missing.txt"));
        assert_eq!(err.to_string(), "file not found: /tmp/missing.txt");

        let err = ImportError::from(ValidationError::InvalidUrl("http://x.com".into()));
        assert_eq!(err.to_string(), "not a valid HTTPS URL: http://x.com");
    }
}
