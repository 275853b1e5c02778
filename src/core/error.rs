//! Error taxonomy for the chat core.
//!
//! Only [`TransportError`] ever reaches the end user, rendered as a failed
//! assistant entry through [`TransportError::user_message`]. Validation and
//! state errors are programmer-facing; persistence errors are logged and
//! swallowed by the theme store.

use crate::core::config::data::path_display;
use crate::core::message::EntryId;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// User input rejected before any state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input was empty once surrounding whitespace was removed.
    EmptyInput,
    /// A suggested question was requested by an index that does not exist.
    UnknownSuggestion { index: usize, available: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyInput => write!(f, "Message is empty"),
            ValidationError::UnknownSuggestion { index, available } => write!(
                f,
                "No suggested question at position {} ({} available)",
                index + 1,
                available
            ),
        }
    }
}

impl StdError for ValidationError {}

/// A call that violates the transcript or controller contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidStateError {
    /// A turn is already in flight.
    AlreadySending,
    /// A pending assistant entry already exists.
    PendingOutstanding { id: EntryId },
    /// The entry exists but has already reached a terminal status.
    NotPending { id: EntryId },
    /// No entry with this id was ever appended.
    UnknownEntry { id: EntryId },
    /// The controller was torn down and accepts no further turns.
    TornDown,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidStateError::AlreadySending => {
                write!(f, "A question is already being answered")
            }
            InvalidStateError::PendingOutstanding { id } => {
                write!(f, "Assistant entry {id} is still pending")
            }
            InvalidStateError::NotPending { id } => {
                write!(f, "Entry {id} is not pending")
            }
            InvalidStateError::UnknownEntry { id } => write!(f, "Unknown entry {id}"),
            InvalidStateError::TornDown => write!(f, "Chat view has been closed"),
        }
    }
}

impl StdError for InvalidStateError {}

/// Failure talking to the answering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (connection refused, reset, DNS).
    Network(String),
    /// No response arrived within the configured bound.
    Timeout(Duration),
    /// The service answered with a non-success status.
    Status { status: u16, message: String },
    /// The response body was not the expected shape.
    Malformed(String),
}

impl TransportError {
    /// Short, human-readable text for display in the transcript.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Network(_) => {
                "Could not reach the course assistant. Check your connection and try again."
                    .to_string()
            }
            TransportError::Timeout(limit) => format!(
                "The course assistant did not answer within {}s. Please try again.",
                limit.as_secs()
            ),
            TransportError::Status { status, message } => {
                if message.is_empty() {
                    format!("The course assistant returned an error (HTTP {status}).")
                } else {
                    format!("Error: {message}")
                }
            }
            TransportError::Malformed(_) => {
                "The course assistant sent a response that could not be read.".to_string()
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(detail) => write!(f, "Network error: {detail}"),
            TransportError::Timeout(limit) => {
                write!(f, "Request timed out after {}ms", limit.as_millis())
            }
            TransportError::Status { status, message } => {
                write!(f, "Request failed with status {status}: {message}")
            }
            TransportError::Malformed(detail) => write!(f, "Malformed response: {detail}"),
        }
    }
}

impl StdError for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Malformed(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Preference storage could not be read or written.
#[derive(Debug)]
pub enum PersistenceError {
    /// The store is switched off or has no usable location.
    Unavailable(String),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: Box<dyn StdError + Send + Sync>,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Unavailable(reason) => {
                write!(f, "Preference storage unavailable: {reason}")
            }
            PersistenceError::Read { path, source } => write!(
                f,
                "Failed to read preferences at {}: {}",
                path_display(path),
                source
            ),
            PersistenceError::Write { path, source } => write!(
                f,
                "Failed to write preferences at {}: {}",
                path_display(path),
                source
            ),
            PersistenceError::Parse { path, source } => write!(
                f,
                "Failed to parse preferences at {}: {}",
                path_display(path),
                source
            ),
        }
    }
}

impl StdError for PersistenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistenceError::Unavailable(_) => None,
            PersistenceError::Read { source, .. } => Some(source),
            PersistenceError::Write { source, .. } => Some(source.as_ref()),
            PersistenceError::Parse { source, .. } => Some(source),
        }
    }
}

/// Reasons a submission is refused by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    Validation(ValidationError),
    InvalidState(InvalidStateError),
    Transport(TransportError),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Validation(err) => err.fmt(f),
            ChatError::InvalidState(err) => err.fmt(f),
            ChatError::Transport(err) => err.fmt(f),
        }
    }
}

impl StdError for ChatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatError::Validation(err) => Some(err),
            ChatError::InvalidState(err) => Some(err),
            ChatError::Transport(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ChatError {
    fn from(err: ValidationError) -> Self {
        ChatError::Validation(err)
    }
}

impl From<InvalidStateError> for ChatError {
    fn from(err: InvalidStateError) -> Self {
        ChatError::InvalidState(err)
    }
}

impl From<TransportError> for ChatError {
    fn from(err: TransportError) -> Self {
        ChatError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_never_empty() {
        let errors = [
            TransportError::Network("connection refused".into()),
            TransportError::Timeout(Duration::from_secs(30)),
            TransportError::Status {
                status: 500,
                message: String::new(),
            },
            TransportError::Status {
                status: 500,
                message: "Internal error occurred".into(),
            },
            TransportError::Malformed("expected value".into()),
        ];
        for err in errors {
            assert!(!err.user_message().trim().is_empty(), "{err:?}");
        }
    }

    #[test]
    fn status_message_surfaces_service_detail() {
        let err = TransportError::Status {
            status: 500,
            message: "Session store unavailable".into(),
        };
        assert_eq!(err.user_message(), "Error: Session store unavailable");
    }

    #[test]
    fn timeout_message_reports_seconds() {
        let err = TransportError::Timeout(Duration::from_secs(12));
        assert!(err.user_message().contains("12s"));
    }

    #[test]
    fn chat_error_wraps_sources() {
        let err: ChatError = ValidationError::EmptyInput.into();
        assert_eq!(err.to_string(), "Message is empty");
        assert!(err.source().is_some());
    }
}
