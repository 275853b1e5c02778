use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 2;

/// How much of the conversation accompanies each question.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Send only the question being asked; the service threads history via the session id.
    #[default]
    Latest,
    /// Also send the completed prior turns visible in the transcript.
    Full,
}

impl ContextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextMode::Latest => "latest",
            ContextMode::Full => "full",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root URL of the answering service (endpoints live under `/api`)
    pub base_url: Option<String>,
    #[serde(default)]
    pub context_mode: ContextMode,
    /// Upper bound on a single question, in seconds
    pub request_timeout_secs: Option<u64>,
    /// Prior turns sent when `context_mode = "full"`
    pub max_history_turns: Option<usize>,
    /// Questions offered as one-key shortcuts in the chat view
    #[serde(default = "default_suggested_questions")]
    pub suggested_questions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            context_mode: ContextMode::default(),
            request_timeout_secs: None,
            max_history_turns: None,
            suggested_questions: default_suggested_questions(),
        }
    }
}

fn default_suggested_questions() -> Vec<String> {
    [
        "What courses are available?",
        "Outline the first lesson of the Python course",
        "Which lessons cover retrieval-augmented generation?",
        "How do I get started with machine learning?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn max_history_turns(&self) -> usize {
        self.max_history_turns.unwrap_or(DEFAULT_MAX_HISTORY_TURNS)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/coursebot/config.toml` → `~/.config/coursebot/config.toml`
/// - macOS: `/Users/user/Library/Application Support/...` → `~/Library/Application Support/...`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
