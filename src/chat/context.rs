//! Per-user chat state
//!
//! [`ChatContext`] replaces a framework-managed state bag: it is created by
//! the front end, passed to every orchestrator action and owns nothing but
//! in-memory view state.

use crate::attachment::AttachedImage;
use crate::chat::ConversationTurn;
use crate::storage::{AccountId, SessionId};

/// Authentication status of a context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Guest; limited by the guest quota
    #[default]
    Anonymous,
    /// Logged in
    Authenticated {
        /// Account identifier returned by the store
        account_id: AccountId,
        /// Username used at login
        username: String,
    },
}

/// Explicit state for one user of the chat
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    /// Who is using the chat
    pub auth: AuthState,
    /// Persistent session receiving new turns, if any
    pub selected_session: Option<SessionId>,
    /// Turns shown to the user, oldest first
    pub conversation: Vec<ConversationTurn>,
    /// Image that questions refer to
    pub attached_image: Option<AttachedImage>,
    /// Successful exchanges made while anonymous
    pub guest_messages: u32,
}

impl ChatContext {
    /// A fresh anonymous context
    pub fn new() -> Self {
        Self::default()
    }

    /// Account of the logged-in user
    pub fn account_id(&self) -> Option<AccountId> {
        match &self.auth {
            AuthState::Authenticated { account_id, .. } => Some(*account_id),
            AuthState::Anonymous => None,
        }
    }

    /// Username of the logged-in user
    pub fn username(&self) -> Option<&str> {
        match &self.auth {
            AuthState::Authenticated { username, .. } => Some(username),
            AuthState::Anonymous => None,
        }
    }

    /// Whether a login has succeeded on this context
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    /// Forget the conversation view and attached image
    pub(crate) fn clear_view(&mut self) {
        self.conversation.clear();
        self.attached_image = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_anonymous_and_empty() {
        let ctx = ChatContext::new();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.account_id(), None);
        assert_eq!(ctx.username(), None);
        assert!(ctx.selected_session.is_none());
        assert!(ctx.conversation.is_empty());
        assert_eq!(ctx.guest_messages, 0);
    }

    #[test]
    fn test_authenticated_accessors() {
        let ctx = ChatContext {
            auth: AuthState::Authenticated {
                account_id: AccountId(3),
                username: "alice".to_string(),
            },
            ..ChatContext::default()
        };
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.account_id(), Some(AccountId(3)));
        assert_eq!(ctx.username(), Some("alice"));
    }
}
