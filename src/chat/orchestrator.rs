//! Chat actions
//!
//! [`ChatOrchestrator`] turns user actions into store calls and vision
//! provider calls. Each action takes the caller's [`ChatContext`] and runs
//! to completion before returning. Rejected actions return a
//! [`ChatWarning`] and leave the store, the provider and the context
//! untouched.

use crate::attachment::AttachedImage;
use crate::chat::{rebuild_conversation, AuthState, ChatContext, ConversationTurn};
use crate::error::{ChatWarning, Result};
use crate::providers::VisionProvider;
use crate::storage::{AccountId, SenderRole, SessionId, SessionSummary, SqliteStorage};

/// Default number of questions a guest may ask
pub const DEFAULT_GUEST_QUOTA: u32 = 2;

/// Sequences chat actions over the store and the vision provider
pub struct ChatOrchestrator {
    storage: SqliteStorage,
    provider: Box<dyn VisionProvider>,
    guest_quota: u32,
}

impl ChatOrchestrator {
    /// Create an orchestrator with the default guest quota
    pub fn new(storage: SqliteStorage, provider: Box<dyn VisionProvider>) -> Self {
        Self {
            storage,
            provider,
            guest_quota: DEFAULT_GUEST_QUOTA,
        }
    }

    /// Override the guest quota
    pub fn with_guest_quota(mut self, guest_quota: u32) -> Self {
        self.guest_quota = guest_quota;
        self
    }

    /// The configured guest quota
    pub fn guest_quota(&self) -> u32 {
        self.guest_quota
    }

    /// The underlying store
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Name of the active vision provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Register a new account
    ///
    /// Does not log the new account in.
    ///
    /// # Errors
    ///
    /// `EmptyFields` if the username or password is blank, `PasswordMismatch`
    /// if the confirmation differs, `UsernameTaken` if the store refuses the
    /// username.
    pub fn sign_up(&self, username: &str, password: &str, confirm: &str) -> Result<()> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ChatWarning::EmptyFields.into());
        }
        if password != confirm {
            return Err(ChatWarning::PasswordMismatch.into());
        }
        if !self.storage.create_account(username, password)? {
            return Err(ChatWarning::UsernameTaken.into());
        }
        Ok(())
    }

    /// Authenticate and attach the account to `ctx`
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on any mismatch.
    pub fn login(&self, ctx: &mut ChatContext, username: &str, password: &str) -> Result<()> {
        match self.storage.authenticate_account(username, password)? {
            Some(account_id) => {
                tracing::info!("Account {} logged in", account_id);
                ctx.auth = AuthState::Authenticated {
                    account_id,
                    username: username.to_string(),
                };
                Ok(())
            }
            None => {
                tracing::warn!("Rejected login attempt");
                Err(ChatWarning::InvalidCredentials.into())
            }
        }
    }

    /// Drop the login and every piece of in-memory state
    pub fn logout(&self, ctx: &mut ChatContext) {
        if let Some(account_id) = ctx.account_id() {
            tracing::info!("Account {} logged out", account_id);
        }
        *ctx = ChatContext::new();
    }

    /// Sessions of the logged-in account, newest first
    pub fn list_sessions(&self, ctx: &ChatContext) -> Result<Vec<SessionSummary>> {
        let account = require_account(ctx)?;
        self.storage.list_sessions(account)
    }

    /// Create a session, select it and start with an empty view
    pub fn create_session(&self, ctx: &mut ChatContext, name: &str) -> Result<SessionId> {
        let account = require_account(ctx)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatWarning::EmptySessionName.into());
        }

        let session = self.storage.create_session(account, name)?;
        ctx.selected_session = Some(session);
        ctx.clear_view();
        Ok(session)
    }

    /// Select a stored session and rebuild its conversation
    ///
    /// The rebuilt view holds one-sided turns in stored order.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if the session is unknown or belongs to another
    /// account; the context is left as it was.
    pub fn open_session(&self, ctx: &mut ChatContext, session: SessionId) -> Result<()> {
        self.require_owned_session(ctx, session)?;
        let messages = self.storage.list_messages(session)?;

        ctx.selected_session = Some(session);
        ctx.conversation = rebuild_conversation(&messages);
        ctx.attached_image = None;

        tracing::debug!("Opened session {} with {} message(s)", session, messages.len());
        Ok(())
    }

    /// Rename a session and return the refreshed session list
    ///
    /// Only sessions owned by the logged-in account can be renamed.
    pub fn rename_session(
        &self,
        ctx: &ChatContext,
        session: SessionId,
        new_name: &str,
    ) -> Result<Vec<SessionSummary>> {
        let account = self.require_owned_session(ctx, session)?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ChatWarning::EmptySessionName.into());
        }

        self.storage.rename_session(session, new_name)?;
        self.storage.list_sessions(account)
    }

    /// Delete a session and return the refreshed session list
    ///
    /// Deleting the selected session also clears the selection and view.
    /// Only sessions owned by the logged-in account can be deleted.
    pub fn delete_session(
        &self,
        ctx: &mut ChatContext,
        session: SessionId,
    ) -> Result<Vec<SessionSummary>> {
        let account = self.require_owned_session(ctx, session)?;

        self.storage.delete_session(session)?;
        if ctx.selected_session == Some(session) {
            ctx.selected_session = None;
            ctx.conversation.clear();
        }

        self.storage.list_sessions(account)
    }

    /// Make `image` the subject of following questions
    pub fn attach_image(&self, ctx: &mut ChatContext, image: AttachedImage) {
        tracing::debug!("Attached image {}", image.file_name());
        ctx.attached_image = Some(image);
    }

    /// Remove the attached image
    pub fn detach_image(&self, ctx: &mut ChatContext) {
        ctx.attached_image = None;
    }

    /// Ask a question about the attached image
    ///
    /// Preconditions are checked in order: guest quota, attached image,
    /// non-blank question. On success the turn is appended to the view and,
    /// when a session is selected, stored as a `user` message followed by a
    /// `bot` message. Guests are charged one quota unit per successful
    /// exchange only.
    ///
    /// # Errors
    ///
    /// `QuotaExceeded`, `NoImage` or `EmptyQuestion` before any side effect;
    /// provider and storage errors abort the action with nothing added to
    /// the view and nothing charged.
    pub async fn ask(&self, ctx: &mut ChatContext, question: &str) -> Result<ConversationTurn> {
        if !ctx.is_authenticated() && ctx.guest_messages >= self.guest_quota {
            tracing::warn!("Guest quota of {} exhausted", self.guest_quota);
            return Err(ChatWarning::QuotaExceeded {
                limit: self.guest_quota,
            }
            .into());
        }

        let image = ctx.attached_image.as_ref().ok_or(ChatWarning::NoImage)?;

        if question.trim().is_empty() {
            return Err(ChatWarning::EmptyQuestion.into());
        }

        let answer = self.provider.describe(image, question).await.map_err(|e| {
            tracing::error!("{} provider failed: {:#}", self.provider.name(), e);
            e
        })?;

        let turn = ConversationTurn::paired(question, answer);

        if let Some(session) = ctx.selected_session {
            self.storage
                .append_message(session, SenderRole::User, Some(&turn.question))?;
            self.storage
                .append_message(session, SenderRole::Bot, Some(&turn.answer))?;
        }

        ctx.conversation.push(turn.clone());

        if !ctx.is_authenticated() {
            ctx.guest_messages += 1;
        }

        Ok(turn)
    }

    /// Logged-in account, provided it owns `session`
    fn require_owned_session(&self, ctx: &ChatContext, session: SessionId) -> Result<AccountId> {
        let account = require_account(ctx)?;
        match self.storage.session_owner(session)? {
            Some(owner) if owner == account => Ok(account),
            Some(_) => {
                tracing::warn!("Account {} denied access to session {}", account, session);
                Err(ChatWarning::SessionNotFound.into())
            }
            None => Err(ChatWarning::SessionNotFound.into()),
        }
    }
}

fn require_account(ctx: &ChatContext) -> Result<AccountId> {
    ctx.account_id()
        .ok_or_else(|| ChatWarning::NotLoggedIn.into())
}
