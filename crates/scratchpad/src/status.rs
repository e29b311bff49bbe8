use padcore::CursorPosition;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageType {
    fn default_duration(self) -> Duration {
        match self {
            MessageType::Info => Duration::from_secs(3),
            MessageType::Success => Duration::from_secs(2),
            MessageType::Warning => Duration::from_secs(5),
            MessageType::Error => Duration::from_secs(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub message_type: MessageType,
    pub created_at: Instant,
    pub auto_clear_duration: Option<Duration>,
}

impl StatusMessage {
    pub fn new(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            content: content.into(),
            message_type,
            created_at: Instant::now(),
            auto_clear_duration: Some(message_type.default_duration()),
        }
    }

    pub fn with_duration(
        content: impl Into<String>,
        message_type: MessageType,
        duration: Duration,
    ) -> Self {
        Self {
            auto_clear_duration: Some(duration),
            ..Self::new(content, message_type)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.auto_clear_duration
            .is_some_and(|duration| self.created_at.elapsed() > duration)
    }
}

/// Transient status messages shown under the status line.
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    current: Option<StatusMessage>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, message: StatusMessage) {
        self.current = Some(message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Error));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the current message once it has expired.
    pub fn update(&mut self) {
        if self.current.as_ref().is_some_and(StatusMessage::is_expired) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }
}

/// `Line: 1 | Column: 1 | Characters: 0 | Encoding: UTF-8 | Changes made`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub cursor: CursorPosition,
    pub encoding: &'a str,
    pub modified: bool,
}

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line: {} | Column: {} | Characters: {} | Encoding: {} |",
            self.cursor.line, self.cursor.column, self.cursor.char_count, self.encoding
        )?;
        if self.modified {
            write!(f, " Changes made")?;
        }
        Ok(())
    }
}
