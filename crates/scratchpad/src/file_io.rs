use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::mpsc;

use crate::error::IoError;

const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Content to be written, tagged with the document revision it was taken from.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub content: String,
    pub revision: u64,
}

#[derive(Debug)]
enum IoRequest {
    Load { path: PathBuf, revision: u64 },
    Save(SaveRequest),
}

/// Completion of a request submitted to [`FileIo`].
#[derive(Debug)]
pub enum IoEvent {
    /// `revision` is the document revision the load was requested from.
    Loaded {
        path: PathBuf,
        revision: u64,
        result: Result<String, IoError>,
    },
    Saved {
        path: PathBuf,
        revision: u64,
        result: Result<(), IoError>,
    },
}

/// Handle to the background file worker.
///
/// Requests are handled one at a time in submission order, so two saves
/// can never race on the same path.
pub struct FileIo {
    requests: mpsc::UnboundedSender<IoRequest>,
    events: mpsc::UnboundedReceiver<IoEvent>,
    in_flight: usize,
}

impl FileIo {
    /// Start the worker task. Must be called from within a tokio runtime.
    pub fn spawn() -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<IoRequest>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let event = match request {
                    IoRequest::Load { path, revision } => {
                        let result = load(&path).await;
                        IoEvent::Loaded {
                            path,
                            revision,
                            result,
                        }
                    }
                    IoRequest::Save(SaveRequest {
                        path,
                        content,
                        revision,
                    }) => {
                        let result = save(&path, &content).await;
                        IoEvent::Saved {
                            path,
                            revision,
                            result,
                        }
                    }
                };
                if event_tx.send(event).is_err() {
                    log::debug!("File worker receiver dropped, stopping");
                    break;
                }
            }
        });

        Self {
            requests: request_tx,
            events: event_rx,
            in_flight: 0,
        }
    }

    pub fn load(&mut self, path: PathBuf, revision: u64) {
        log::debug!("Queueing load: {} (revision {})", path.display(), revision);
        self.submit(IoRequest::Load { path, revision });
    }

    pub fn save(&mut self, request: SaveRequest) {
        log::debug!(
            "Queueing save: {} (revision {})",
            request.path.display(),
            request.revision
        );
        self.submit(IoRequest::Save(request));
    }

    /// Number of submitted requests whose completion has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Non-blocking poll for a completion, used by the UI loop.
    pub fn try_next_event(&mut self) -> Option<IoEvent> {
        let event = self.events.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Wait for the next completion. Returns `None` if nothing is pending.
    pub async fn next_event(&mut self) -> Option<IoEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let event = self.events.recv().await?;
        self.in_flight -= 1;
        Some(event)
    }

    fn submit(&mut self, request: IoRequest) {
        if self.requests.send(request).is_err() {
            log::error!("File worker is not running; request dropped");
            return;
        }
        self.in_flight += 1;
    }
}

/// Read a whole file as UTF-8 text.
pub async fn load(path: &Path) -> Result<String, IoError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| IoError::from_io(path.to_path_buf(), e))?;

    if !metadata.is_file() {
        return Err(IoError::NotAFile(path.to_path_buf()));
    }

    if metadata.len() > LARGE_FILE_THRESHOLD {
        log::warn!(
            "Large file detected ({} bytes): {}",
            metadata.len(),
            path.display()
        );
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| IoError::from_io(path.to_path_buf(), e))?;

    match String::from_utf8(bytes) {
        Ok(content) => {
            log::info!("Successfully opened file: {}", path.display());
            Ok(content)
        }
        Err(_) => Err(IoError::InvalidUtf8(path.to_path_buf())),
    }
}

/// Write `content` to `path`, replacing the file. No retry, no backup.
pub async fn save(path: &Path, content: &str) -> Result<(), IoError> {
    match fs::write(path, content.as_bytes()).await {
        Ok(()) => {
            log::info!("Successfully saved file: {}", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to save {}: {}", path.display(), e);
            Err(IoError::from_io(path.to_path_buf(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let samples = [
            "",
            "Hello World\nTest content",
            "no trailing newline",
            "crlf\r\nline endings\r\n",
            "日本語と絵文字 😀\n",
        ];

        for (i, sample) in samples.iter().enumerate() {
            let path = dir.path().join(format!("sample{i}.txt"));
            save(&path, sample).await.unwrap();
            assert_eq!(load(&path).await.unwrap(), *sample);
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = load(&dir.path().join("missing.txt")).await;
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_file_is_not_an_error() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(load(file.path()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_load_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = load(dir.path()).await;
        assert!(matches!(result, Err(IoError::NotAFile(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0x6f, 0xff, 0xfe]).unwrap();
        let result = load(file.path()).await;
        assert!(matches!(result, Err(IoError::InvalidUtf8(_))));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("file.txt");
        let result = save(&path, "content").await;
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_worker_delivers_events_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worker.txt");
        let mut io = FileIo::spawn();

        io.save(SaveRequest {
            path: path.clone(),
            content: "first".into(),
            revision: 1,
        });
        io.save(SaveRequest {
            path: path.clone(),
            content: "second".into(),
            revision: 2,
        });
        io.load(path.clone(), 2);
        assert_eq!(io.in_flight(), 3);

        match io.next_event().await {
            Some(IoEvent::Saved { revision, result, .. }) => {
                assert_eq!(revision, 1);
                assert!(result.is_ok());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match io.next_event().await {
            Some(IoEvent::Saved { revision, .. }) => assert_eq!(revision, 2),
            other => panic!("unexpected event: {other:?}"),
        }
        match io.next_event().await {
            Some(IoEvent::Loaded {
                revision, result, ..
            }) => {
                assert_eq!(revision, 2);
                assert_eq!(result.unwrap(), "second");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert_eq!(io.in_flight(), 0);
        assert!(io.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_reports_load_failure_as_error() {
        let dir = TempDir::new().unwrap();
        let mut io = FileIo::spawn();
        io.load(dir.path().join("absent.txt"), 0);

        match io.next_event().await {
            Some(IoEvent::Loaded { result, .. }) => assert!(result.is_err()),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
