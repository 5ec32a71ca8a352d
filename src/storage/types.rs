use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Identifier of a registered account (`users.id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a chat session (`chat_sessions.id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SessionId)
    }
}

/// Who produced a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderRole {
    /// The human asking about the image
    User,
    /// The vision model's answer
    Bot,
}

impl SenderRole {
    /// Text form stored in the `sender` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SenderRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            other => Err(format!("Unknown sender role: {}", other)),
        }
    }
}

/// A chat session as shown in a session list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Stable identifier, unchanged by renames
    pub id: SessionId,
    /// Current display name
    pub name: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

/// One persisted message of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Sender role of the message
    pub sender: SenderRole,
    /// Message text; absent bodies are kept as `None`
    pub body: Option<String>,
    /// Creation time, used for ordering
    pub timestamp: DateTime<Utc>,
}
