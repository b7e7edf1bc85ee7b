//! Conversation messages and the transcript built from them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The local user (prompts and follow-up instructions).
    User,
    /// The remote assistant.
    Assistant,
}

impl Role {
    /// Returns the other party of the conversation.
    pub fn counterpart(self) -> Role {
        match self {
            Role::User => Role::Assistant,
            Role::Assistant => Role::User,
        }
    }

    /// Parses the role string used by the remote service.
    pub fn from_remote(role: &str) -> Option<Role> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A single immutable message of a thread.
///
/// The recipient is always the counterpart of the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: Role,
    text: String,
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message.
    pub fn new(sender: Role, text: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            sender,
            text: text.into(),
            created_at,
        }
    }

    /// Returns who sent the message.
    pub fn sender(&self) -> Role {
        self.sender
    }

    /// Returns who the message was addressed to.
    pub fn recipient(&self) -> Role {
        self.sender.counterpart()
    }

    /// Returns the message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Serialized form of a message in the transcript artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Role,
    pub recipient: Role,
    pub text: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl From<&Message> for TranscriptEntry {
    fn from(message: &Message) -> Self {
        Self {
            sender: message.sender(),
            recipient: message.recipient(),
            text: message.text().to_string(),
            timestamp: message.created_at().as_unix_secs(),
        }
    }
}

/// Conversation history of one thread, as last loaded from the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates a transcript from messages in any order.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Returns the messages in the order they were supplied.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when the transcript holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns transcript entries sorted ascending by timestamp.
    ///
    /// Ties are broken by sender and text so that any permutation of the same
    /// message set yields the same sequence.
    pub fn sorted_entries(&self) -> Vec<TranscriptEntry> {
        let mut entries: Vec<TranscriptEntry> =
            self.messages.iter().map(TranscriptEntry::from).collect();
        entries.sort_by(|a, b| {
            (a.timestamp, a.sender, a.recipient, &a.text).cmp(&(
                b.timestamp,
                b.sender,
                b.recipient,
                &b.text,
            ))
        });
        entries
    }

    /// Returns the most recent assistant reply, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .filter(|m| m.sender() == Role::Assistant)
            .max_by_key(|m| m.created_at())
            .map(|m| m.text())
    }

    /// Joins all message texts with a single space.
    pub fn joined_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: Role, text: &str, secs: i64) -> Message {
        Message::new(sender, text, Timestamp::from_unix_secs(secs))
    }

    #[test]
    fn recipient_is_counterpart_of_sender() {
        assert_eq!(msg(Role::User, "hi", 1).recipient(), Role::Assistant);
        assert_eq!(msg(Role::Assistant, "hello", 2).recipient(), Role::User);
    }

    #[test]
    fn from_remote_recognises_roles() {
        assert_eq!(Role::from_remote("user"), Some(Role::User));
        assert_eq!(Role::from_remote("assistant"), Some(Role::Assistant));
        assert_eq!(Role::from_remote("system"), None);
    }

    #[test]
    fn sorted_entries_orders_by_timestamp() {
        let transcript = Transcript::new(vec![
            msg(Role::Assistant, "SELECT 1", 30),
            msg(Role::User, "query", 10),
            msg(Role::User, "run it", 40),
        ]);

        let texts: Vec<String> = transcript
            .sorted_entries()
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["query", "SELECT 1", "run it"]);
    }

    #[test]
    fn entries_serialize_with_lowercase_roles() {
        let entry = TranscriptEntry::from(&msg(Role::User, "q", 5));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["recipient"], "assistant");
        assert_eq!(json["timestamp"], 5);
    }

    #[test]
    fn last_assistant_text_picks_latest_reply() {
        let transcript = Transcript::new(vec![
            msg(Role::Assistant, "late", 50),
            msg(Role::Assistant, "early", 20),
            msg(Role::User, "question", 10),
        ]);
        assert_eq!(transcript.last_assistant_text(), Some("late"));
    }

    #[test]
    fn joined_text_uses_single_spaces() {
        let transcript = Transcript::new(vec![msg(Role::User, "a", 1), msg(Role::Assistant, "b", 2)]);
        assert_eq!(transcript.joined_text(), "a b");
    }
}
