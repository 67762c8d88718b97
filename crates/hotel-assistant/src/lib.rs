//! A hotel concierge chatbot built on a tool-calling orchestrator.
//!
//! The crate includes a CLI tool for chatting in the terminal. It can also be
//! used as a library to host the assistant in other front-ends.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod config;
pub mod rag;
mod session;
pub mod tools;

pub use config::{AssistantConfig, ConfigError, InventorySource};
pub use session::{Session, SessionBuilder, SessionError, render_system_prompt};

/// Re-exports of [`hotel_assistant_core`] crate.
pub mod core {
    pub use hotel_assistant_core::*;
}
