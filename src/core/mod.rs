pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod theme_store;
pub mod theme_toggle;
pub mod transcript;
pub mod transport;
