//! Chat orchestration
//!
//! This module holds the per-user [`ChatContext`], the in-memory
//! conversation view and the [`ChatOrchestrator`] that maps user actions
//! onto the store and the vision provider.

pub mod context;
pub mod conversation;
pub mod orchestrator;

pub use context::{AuthState, ChatContext};
pub use conversation::{rebuild_conversation, ConversationTurn};
pub use orchestrator::{ChatOrchestrator, DEFAULT_GUEST_QUOTA};
