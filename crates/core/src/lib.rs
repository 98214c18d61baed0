//! # FileChat Core
//!
//! Domain types, traits, and error definitions shared by every FileChat crate.
//! This crate has **no I/O of its own** — it defines the conversation model and
//! the provider abstraction that the other crates implement against.
//!
//! ## Layout
//!
//! - [`message`] — chat turns and the bounded conversation history
//! - [`provider`] — the LLM backend trait and its request/response types
//! - [`error`] — the top-level error and its bounded-context variants

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{ContextError, Error, ProviderError, Result};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};
