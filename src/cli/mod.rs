//! Command-line interface parsing and handling
//!
//! Parses arguments, sets up logging, and dispatches to the chat view or one
//! of the line-oriented commands.

pub mod ask;
pub mod courses;
pub mod theme;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::ask::ask_question;
use crate::cli::courses::list_courses;
use crate::cli::theme::{run_theme_command, ThemeCommand};
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_tracing, LogTarget};
use crate::utils::url::normalize_base_url;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", ",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[derive(Parser)]
#[command(name = "coursebot")]
#[command(about = "Ask questions about course materials from the terminal")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    long_about = "Coursebot is a terminal chat client for a course-materials question \
answering service. Each question is sent to the service and the answer, with its \
sources, is added to the conversation.\n\n\
Configuration is read from config.toml in the platform config directory.\n\n\
Environment Variables:\n\
  COURSEBOT_LOG     Log filter (e.g. debug, coursebot=trace)\n\n\
Controls:\n\
  Type              Enter your question in the input field\n\
  Enter             Send the question\n\
  Alt+1..9, F1..F4  Ask a suggested question\n\
  Ctrl+T            Toggle light/dark theme\n\
  Up/Down/PgUp/PgDn Scroll through the conversation\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the answering service (overrides the config file)
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// Ask the Nth configured suggested question instead (1-based)
        #[arg(short = 's', long, value_name = "N", conflicts_with = "question")]
        suggested: Option<usize>,
        /// The question to ask
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Show the courses known to the service
    Courses,
    /// Show or toggle the persisted light/dark preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },
    /// Print the effective configuration
    Config {
        /// Write a config file with default values if none exists
        #[arg(long)]
        init: bool,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);

    let full_screen = matches!(command, Commands::Chat);
    init_tracing(
        args.verbose,
        LogTarget::select(args.log_file.as_deref(), full_screen),
    )?;

    let config = Config::load()?;
    let base_url = resolve_base_url(args.base_url.as_deref(), &config);

    match command {
        Commands::Chat => run_chat(&config, &base_url).await,
        Commands::Ask {
            suggested,
            question,
        } => ask_question(&config, &base_url, suggested, question).await,
        Commands::Courses => list_courses(&base_url).await,
        Commands::Theme { action } => run_theme_command(action.unwrap_or_default()),
        Commands::Config { init } => {
            let config_path = Config::get_config_path()?;
            if init {
                if config_path.exists() {
                    println!(
                        "Config already exists at {}",
                        crate::core::config::data::path_display(&config_path)
                    );
                } else {
                    Config::default().save_to_path(&config_path)?;
                    println!(
                        "✅ Wrote default config to {}",
                        crate::core::config::data::path_display(&config_path)
                    );
                }
            }
            config.print_all(Some(&config_path));
            Ok(())
        }
    }
}

/// The command-line flag wins over the config file; blank values are ignored.
fn resolve_base_url(flag: Option<&str>, config: &Config) -> String {
    match flag.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => normalize_base_url(url),
        None => normalize_base_url(config.base_url()),
    }
}
