use crate::core::config::data::{path_display, Config};
use std::path::Path;

impl Config {
    pub fn print_all(&self, source: Option<&Path>) {
        match source {
            Some(path) => println!("Current configuration ({}):", path_display(path)),
            None => println!("Current configuration:"),
        }
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: {} (default)", self.base_url()),
        }
        println!("  context-mode: {}", self.context_mode.as_str());
        println!("  request-timeout: {}s", self.request_timeout().as_secs());
        println!("  max-history-turns: {}", self.max_history_turns());
        if self.suggested_questions.is_empty() {
            println!("  suggested-questions: (none)");
        } else {
            println!("  suggested-questions:");
            for (index, question) in self.suggested_questions.iter().enumerate() {
                println!("    {}. {question}", index + 1);
            }
        }
    }
}
