//! Context builder — the per-turn entry point of the context pipeline.
//!
//! Owns the project snapshot and ties the stages together:
//! matcher (current message) + continuity (recent turns) → selection →
//! packer. The last selection is kept for introspection only and never feeds
//! the next turn.

use crate::context::continuity::{CONTINUITY_WINDOW, ContinuityTracker};
use crate::context::index::{ProjectIndex, ScanOptions};
use crate::context::matcher::{KEYWORD_MATCH_LIMIT, RelevanceMatcher};
use crate::context::packer::{BudgetPacker, DEFAULT_BUDGET, MAX_FILE_CHARS, PackReport};
use crate::context::selection::ContextSelection;
use filechat_config::ContextConfig;
use filechat_core::error::ContextError;
use filechat_core::message::Message;
use std::path::Path;
use tracing::debug;

/// Per-turn limits for selection and packing.
#[derive(Debug, Clone)]
pub struct ContextLimits {
    pub enabled: bool,
    pub budget_chars: usize,
    pub max_file_chars: usize,
    pub keyword_match_limit: usize,
    pub continuity_window: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            enabled: true,
            budget_chars: DEFAULT_BUDGET,
            max_file_chars: MAX_FILE_CHARS,
            keyword_match_limit: KEYWORD_MATCH_LIMIT,
            continuity_window: CONTINUITY_WINDOW,
        }
    }
}

impl From<&ContextConfig> for ContextLimits {
    fn from(config: &ContextConfig) -> Self {
        Self {
            enabled: config.enabled,
            budget_chars: config.budget_chars,
            max_file_chars: config.max_file_chars,
            keyword_match_limit: config.keyword_match_limit,
            continuity_window: config.continuity_window,
        }
    }
}

/// Builds the project-context prefix for each user turn.
pub struct ContextBuilder {
    index: ProjectIndex,
    limits: ContextLimits,
    current: Vec<String>,
}

impl ContextBuilder {
    pub fn new(index: ProjectIndex, limits: ContextLimits) -> Self {
        Self {
            index,
            limits,
            current: Vec::new(),
        }
    }

    /// Scan `root` and build with limits taken from `config`.
    pub fn scan(root: impl AsRef<Path>, config: &ContextConfig) -> Result<Self, ContextError> {
        let index = ProjectIndex::scan(root, &ScanOptions::from(config))?;
        Ok(Self::new(index, ContextLimits::from(config)))
    }

    /// A builder that never attaches anything.
    pub fn disabled() -> Self {
        Self::new(
            ProjectIndex::from_files(".", Vec::new()),
            ContextLimits {
                enabled: false,
                ..ContextLimits::default()
            },
        )
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    pub fn limits(&self) -> &ContextLimits {
        &self.limits
    }

    pub fn is_enabled(&self) -> bool {
        self.limits.enabled
    }

    /// Files chosen for `message`: its own candidates first, then those
    /// carried over from recent user turns in `history`.
    pub fn select(&self, message: &str, history: &[Message]) -> ContextSelection {
        if !self.limits.enabled {
            return ContextSelection::new();
        }

        let matcher =
            RelevanceMatcher::new(&self.index).with_keyword_limit(self.limits.keyword_match_limit);
        let mut selection = matcher.extract_candidates(message);
        let carried = ContinuityTracker::new(self.limits.continuity_window)
            .recently_mentioned(&matcher, history);

        let before = selection.len();
        selection.merge(carried);
        debug!(
            from_message = before,
            from_history = selection.len() - before,
            "Selected context files"
        );
        selection
    }

    /// Packed context for `message`, or `""` when nothing is relevant.
    ///
    /// `history` is the conversation before this turn, not including `message`.
    pub fn build_context(&mut self, message: &str, history: &[Message]) -> String {
        self.build_report(message, history).0
    }

    /// [`build_context`](Self::build_context), plus the packer's report.
    pub fn build_report(&mut self, message: &str, history: &[Message]) -> (String, PackReport) {
        let selection = self.select(message, history);
        self.current = selection.into_vec();

        BudgetPacker::new(&self.index)
            .with_max_file_chars(self.limits.max_file_chars)
            .pack_report(&self.current, self.limits.budget_chars)
    }

    /// The selection made by the most recent build.
    pub fn current_context(&self) -> &[String] {
        &self.current
    }

    pub fn clear_current(&mut self) {
        self.current.clear();
    }
}
