//! Terminal interface for the course assistant.
//!
//! - [`chat_loop`]: event loop, key bindings, and terminal lifecycle.
//! - [`renderer`] and [`transcript_view`]: frame composition.
//! - [`theme`]: the dark and light palettes.
//!
//! Conversation rules live in [`crate::core`]; this layer only presents them.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
pub mod transcript_view;
