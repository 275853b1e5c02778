use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TranscriptRole {
    User,
    Assistant,
}

impl TranscriptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == TranscriptRole::User
    }

    pub fn is_assistant(self) -> bool {
        self == TranscriptRole::Assistant
    }
}

impl AsRef<str> for TranscriptRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for TranscriptRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(TranscriptRole::User),
            "assistant" => Ok(TranscriptRole::Assistant),
            _ => Err(format!("invalid transcript role: {value}")),
        }
    }
}

impl TryFrom<String> for TranscriptRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TranscriptRole> for String {
    fn from(value: TranscriptRole) -> Self {
        value.as_str().to_string()
    }
}

/// Lifecycle of a transcript entry. `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Complete,
    Failed,
}

impl EntryStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

/// Stable identity of an entry within one transcript. Ids grow with creation
/// order, so comparing two ids compares when their entries were appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntry {
    pub id: EntryId,
    pub role: TranscriptRole,
    pub content: String,
    pub status: EntryStatus,
    /// Source citations returned alongside an assistant answer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageEntry {
    pub(crate) fn user(id: EntryId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: TranscriptRole::User,
            content: content.into(),
            status: EntryStatus::Complete,
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn pending_assistant(id: EntryId) -> Self {
        Self {
            id,
            role: TranscriptRole::Assistant,
            content: String::new(),
            status: EntryStatus::Pending,
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(TranscriptRole::try_from("system").is_err());
        assert_eq!(
            TranscriptRole::try_from("assistant"),
            Ok(TranscriptRole::Assistant)
        );
    }

    #[test]
    fn pending_is_the_only_non_terminal_status() {
        assert!(!EntryStatus::Pending.is_terminal());
        assert!(EntryStatus::Complete.is_terminal());
        assert!(EntryStatus::Failed.is_terminal());
    }

    #[test]
    fn entry_ids_order_by_creation() {
        assert!(EntryId(1) < EntryId(2));
        assert_eq!(EntryId(7).to_string(), "#7");
    }

    #[test]
    fn entries_serialize_roles_as_plain_strings() {
        let entry = MessageEntry::user(EntryId(0), "hello");
        let json = serde_json::to_value(&entry).expect("serialize entry");
        assert_eq!(json["role"], "user");
        assert_eq!(json["status"], "complete");
        assert!(json.get("sources").is_none());
    }
}
