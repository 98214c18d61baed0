//! Conversation continuity — files mentioned in the last few turns stay in
//! context for follow-up questions that no longer name them.

use crate::context::matcher::RelevanceMatcher;
use crate::context::selection::ContextSelection;
use filechat_core::message::{Message, Role};

/// Trailing turns (any role) inspected for earlier file mentions.
pub const CONTINUITY_WINDOW: usize = filechat_config::DEFAULT_CONTINUITY_WINDOW;

/// Re-surfaces files referenced by recent user turns.
#[derive(Debug, Clone, Copy)]
pub struct ContinuityTracker {
    window: usize,
}

impl Default for ContinuityTracker {
    fn default() -> Self {
        Self::new(CONTINUITY_WINDOW)
    }
}

impl ContinuityTracker {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Union of the candidates of each user turn among the last `window`
    /// turns, oldest first.
    ///
    /// The window is counted over all roles before filtering, so a long
    /// assistant reply still occupies a slot.
    pub fn recently_mentioned(
        &self,
        matcher: &RelevanceMatcher<'_>,
        history: &[Message],
    ) -> ContextSelection {
        let start = history.len().saturating_sub(self.window);
        let mut selection = ContextSelection::new();
        for turn in history[start..].iter().filter(|m| m.role == Role::User) {
            selection.merge(matcher.extract_candidates(&turn.content));
        }
        selection
    }
}
