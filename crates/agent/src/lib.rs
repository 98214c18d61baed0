//! The FileChat chat session and the project-context pipeline behind it.
//!
//! Every user turn goes through the same steps:
//!
//! 1. **Select** project files named in the message, matched by topic, or
//!    mentioned in the last few turns
//! 2. **Pack** them into a fixed character budget
//! 3. **Send** the packed context ahead of the message to the provider
//! 4. **Record** the plain message and the reply in the bounded history
//!
//! The project is scanned once when the session starts; the snapshot is not
//! refreshed while the session runs.

pub mod context;
pub mod session;

pub use context::{
    BudgetPacker, ContextBuilder, ContextLimits, ContextSelection, ContinuityTracker, PackReport,
    ProjectFile, ProjectIndex, ReadError, RelevanceMatcher, ScanOptions,
};
pub use session::{ChatSession, TurnOutcome};
