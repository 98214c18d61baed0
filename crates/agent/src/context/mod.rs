//! Project context assembly.
//!
//! Decides, per user turn, which project files are attached to the model
//! request and packs them into a fixed character budget.
//!
//! # Pipeline
//!
//! | Stage | Type | Input |
//! |-------|------|-------|
//! | 1. Snapshot | [`ProjectIndex`] | Project root, scanned once per session |
//! | 2. Literal + keyword match | [`RelevanceMatcher`] | Current message |
//! | 3. Continuity | [`ContinuityTracker`] | Last few turns of history |
//! | 4. Packing | [`BudgetPacker`] | Ordered, deduplicated selection |
//!
//! [`ContextBuilder`] runs the stages and keeps the last selection for
//! introspection.

pub mod builder;
pub mod continuity;
pub mod index;
pub mod matcher;
pub mod packer;
pub mod selection;

pub use builder::{ContextBuilder, ContextLimits};
pub use continuity::{CONTINUITY_WINDOW, ContinuityTracker};
pub use index::{ProjectFile, ProjectIndex, ReadError, ScanOptions};
pub use matcher::{KEYWORD_MATCH_LIMIT, RelevanceMatcher};
pub use packer::{BudgetPacker, DEFAULT_BUDGET, FRAMING_OVERHEAD, MAX_FILE_CHARS, PackReport};
pub use selection::ContextSelection;
