//! LLM Provider implementations for FileChat.
//!
//! All providers implement the `filechat_core::Provider` trait.
//! The router selects the correct provider based on configuration, and
//! [`RetryProvider`] wraps it with the caller-side retry policy.

pub mod openai_compat;
pub mod retry;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use retry::{RetryPolicy, RetryProvider};
pub use router::ProviderRouter;
