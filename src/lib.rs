//! Coursebot is a terminal chat client for a course-materials question
//! answering service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation: the append-only transcript, the turn
//!   controller that keeps at most one question in flight, the transport to
//!   the answering service, and the persisted light/dark preference.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`api`] defines the request and response payloads of the service.
//! - [`cli`] parses arguments and dispatches to the chat view or one-shot
//!   commands.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
