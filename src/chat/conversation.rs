//! In-memory conversation view

use crate::storage::{SenderRole, StoredMessage};

/// One entry of the conversation shown to the user
///
/// Live exchanges produce paired turns. Turns rebuilt from storage are
/// one-sided: a stored `user` message becomes a question-only turn and a
/// stored `bot` message an answer-only turn. The unused side is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationTurn {
    /// The question asked, or empty
    pub question: String,
    /// The model's answer, or empty
    pub answer: String,
}

impl ConversationTurn {
    /// A complete question/answer exchange
    pub fn paired(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// A turn carrying only a question
    pub fn question_only(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: String::new(),
        }
    }

    /// A turn carrying only an answer
    pub fn answer_only(answer: impl Into<String>) -> Self {
        Self {
            question: String::new(),
            answer: answer.into(),
        }
    }
}

/// Rebuild the conversation view from stored messages, keeping stored order
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use saanra::chat::{rebuild_conversation, ConversationTurn};
/// use saanra::storage::{SenderRole, StoredMessage};
///
/// let stored = vec![
///     StoredMessage { sender: SenderRole::User, body: Some("what?".into()), timestamp: Utc::now() },
///     StoredMessage { sender: SenderRole::Bot, body: Some("a cat".into()), timestamp: Utc::now() },
/// ];
/// let turns = rebuild_conversation(&stored);
/// assert_eq!(turns[0], ConversationTurn::question_only("what?"));
/// assert_eq!(turns[1], ConversationTurn::answer_only("a cat"));
/// ```
pub fn rebuild_conversation(messages: &[StoredMessage]) -> Vec<ConversationTurn> {
    messages
        .iter()
        .map(|message| {
            let body = message.body.clone().unwrap_or_default();
            match message.sender {
                SenderRole::User => ConversationTurn::question_only(body),
                SenderRole::Bot => ConversationTurn::answer_only(body),
            }
        })
        .collect()
}
