//! Chat session — one conversation with a provider, enriched with project context.
//!
//! Each turn:
//!
//! 1. **Select** project files for the message and recent history
//! 2. **Send** `[system, history..., user(context + message)]` to the provider
//! 3. **Record** the unprefixed message and the reply in the bounded history
//!
//! A failed turn leaves the history untouched, so the user can simply retry.

use crate::context::ContextBuilder;
use filechat_config::AppConfig;
use filechat_core::error::{ProviderError, Result};
use filechat_core::message::{Conversation, Message};
use filechat_core::provider::{Provider, ProviderRequest, Usage};
use std::sync::Arc;
use tracing::{debug, info};

/// The result of one successful turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The assistant's full reply
    pub reply: String,
    /// Files selected for this turn, in selection order
    pub context_files: Vec<String>,
    /// Token usage, when the provider reports it
    pub usage: Option<Usage>,
}

/// A running conversation with context assembly.
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    context: ContextBuilder,
    conversation: Conversation,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, context: ContextBuilder) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            system_prompt: String::new(),
            context,
            conversation: Conversation::new(),
        }
    }

    /// Session with model, sampling, prompt and history settings from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        config: &AppConfig,
        context: ContextBuilder,
    ) -> Self {
        Self::new(provider, &config.default_model, context)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_system_prompt(&config.system_prompt)
            .with_history_limit(config.context.history_limit)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Prepended to every request; never stored in the history.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.conversation = Conversation::with_limit(limit);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    /// Files selected for the most recent turn.
    pub fn current_context(&self) -> &[String] {
        self.context.current_context()
    }

    /// Stored turns, oldest first. User turns hold the message as typed.
    pub fn history(&self) -> &[Message] {
        &self.conversation.messages
    }

    /// Forget the conversation and the last selection.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.context.clear_current();
        info!(conversation_id = %self.conversation.id, "Conversation cleared");
    }

    /// Send one message and wait for the complete reply.
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome> {
        let request = self.prepare(text, false);
        let response = self.provider.complete(request).await?;

        let reply = response.message.content;
        self.record(text, &reply);
        Ok(self.outcome(reply, response.usage))
    }

    /// Send one message, handing each text delta to `on_chunk` as it arrives.
    ///
    /// An error mid-stream fails the whole turn; partial output is not recorded.
    pub async fn send_streaming<F>(&mut self, text: &str, mut on_chunk: F) -> Result<TurnOutcome>
    where
        F: FnMut(&str) + Send,
    {
        let request = self.prepare(text, true);
        let mut rx = self.provider.stream(request).await?;

        let mut reply = String::new();
        let mut usage = None;
        while let Some(chunk) = rx.recv().await {
            let chunk = chunk?;
            if let Some(delta) = chunk.content.as_deref().filter(|d| !d.is_empty()) {
                on_chunk(delta);
                reply.push_str(delta);
            }
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
            if chunk.done {
                break;
            }
        }

        if reply.is_empty() && usage.is_none() {
            return Err(ProviderError::StreamInterrupted("stream ended without content".into()).into());
        }

        self.record(text, &reply);
        Ok(self.outcome(reply, usage))
    }

    /// Build the request for `text`, selecting context against the history
    /// as it stood before this turn.
    fn prepare(&mut self, text: &str, stream: bool) -> ProviderRequest {
        let packed = self.context.build_context(text, &self.conversation.messages);

        info!(
            conversation_id = %self.conversation.id,
            history = self.conversation.len(),
            context_files = self.context.current_context().len(),
            "Sending message"
        );
        debug!(context_chars = packed.chars().count(), "Context prefix built");

        let mut messages = Vec::with_capacity(self.conversation.len() + 2);
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(&self.system_prompt));
        }
        messages.extend(self.conversation.messages.iter().cloned());
        messages.push(Message::user(format!("{packed}{text}")));

        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream,
        }
    }

    fn record(&mut self, text: &str, reply: &str) {
        self.conversation.push(Message::user(text));
        self.conversation.push(Message::assistant(reply));
    }

    fn outcome(&self, reply: String, usage: Option<Usage>) -> TurnOutcome {
        TurnOutcome {
            reply,
            context_files: self.context.current_context().to_vec(),
            usage,
        }
    }
}
