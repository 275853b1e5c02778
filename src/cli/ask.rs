use std::error::Error;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::config::Config;
use crate::core::controller::{ChatController, ControllerSettings, SubmitInput, TurnOutcome};
use crate::core::message::MessageEntry;
use crate::core::transport::{build_client, HttpTransport};

pub async fn ask_question(
    config: &Config,
    base_url: &str,
    suggested: Option<usize>,
    question: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let input = submit_input(suggested, &question)?;
    let transport = HttpTransport::new(build_client()?, base_url);
    let mut controller = ChatController::new(ControllerSettings::from(config));

    let abort = CancellationToken::new();
    let watcher = tokio::spawn({
        let abort = abort.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("question abandoned");
                abort.cancel();
            }
        }
    });
    let outcome = controller.run_turn_until(&transport, input, &abort).await;
    watcher.abort();

    match outcome? {
        TurnOutcome::Resolved => {
            if let Some(answer) = controller.transcript().entries().last() {
                print!("{}", format_answer(answer));
            }
            Ok(())
        }
        TurnOutcome::Failed(err) => Err(format!("❌ {}", err.user_message()).into()),
        TurnOutcome::Cancelled => {
            eprintln!("Cancelled");
            Ok(())
        }
    }
}

fn submit_input(suggested: Option<usize>, question: &[String]) -> Result<SubmitInput, String> {
    match suggested {
        // Positions are shown 1-based.
        Some(0) => Err("Suggested questions are numbered from 1".to_string()),
        Some(n) => Ok(SubmitInput::Suggested(n - 1)),
        None if question.is_empty() => {
            Err("Provide a question, or --suggested N for a suggested question".to_string())
        }
        None => Ok(SubmitInput::Typed(question.join(" "))),
    }
}

fn format_answer(entry: &MessageEntry) -> String {
    let mut out = format!("{}\n", entry.content);
    if !entry.sources.is_empty() {
        out.push_str("\nSources:\n");
        for source in &entry.sources {
            out.push_str(&format!("  • {source}\n"));
        }
    }
    out
}
