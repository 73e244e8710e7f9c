//! Ticket data model — the persisted document and its records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket status. Open tickets accept messages from both sides; closed
/// tickets accept none and never reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// One entry in a ticket's message history. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "lowercase")]
pub enum MessageEntry {
    User {
        text: String,
        at: DateTime<Utc>,
    },
    Agent {
        text: String,
        agent_id: String,
        agent_name: String,
        at: DateTime<Utc>,
    },
}

impl MessageEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn agent(
        text: impl Into<String>,
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
    ) -> Self {
        Self::Agent {
            text: text.into(),
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            at: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::User { text, .. } | Self::Agent { text, .. } => text,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent { .. })
    }
}

/// A support ticket: one conversation between a user and the agent pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    /// Stable identity of the originating user.
    pub user_id: String,
    /// Display name shown to agents.
    pub username: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub messages: Vec<MessageEntry>,
    /// Channel the ticket originated from (where replies are forwarded).
    pub chat_id: String,
    /// Correlation token: the review-channel message posted for this
    /// ticket. Set once, after the notification succeeds. A ticket
    /// without a token can never receive a routed agent reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_msg_id: Option<String>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}

/// The persisted store document: all tickets plus the ID counter.
///
/// The counter and the map are always written together in one save, so
/// IDs are unique and never reused across restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketBook {
    #[serde(default)]
    pub tickets: BTreeMap<u64, Ticket>,
    #[serde(default)]
    pub ticket_counter: u64,
}

impl TicketBook {
    /// Allocate the next ticket ID. Monotonic, process-wide, persisted.
    pub fn next_id(&mut self) -> u64 {
        self.ticket_counter += 1;
        self.ticket_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_entry_tags_origin() {
        let user = serde_json::to_value(MessageEntry::user("hi")).unwrap();
        assert_eq!(user["from"], "user");

        let agent = serde_json::to_value(MessageEntry::agent("hello", "7", "alice")).unwrap();
        assert_eq!(agent["from"], "agent");
        assert_eq!(agent["agent_name"], "alice");
    }

    #[test]
    fn ticket_book_roundtrip_keeps_counter_and_map() {
        let mut book = TicketBook::default();
        let id = book.next_id();
        book.tickets.insert(
            id,
            Ticket {
                id,
                user_id: "100".into(),
                username: "alice".into(),
                status: TicketStatus::Open,
                messages: vec![MessageEntry::user("my printer is broken")],
                chat_id: "100".into(),
                review_msg_id: Some("555".into()),
            },
        );

        let raw = serde_json::to_string(&book).unwrap();
        let loaded: TicketBook = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded.ticket_counter, 1);
        assert_eq!(loaded.tickets[&1].review_msg_id.as_deref(), Some("555"));
        assert_eq!(loaded.tickets[&1].messages.len(), 1);
    }

    #[test]
    fn book_tolerates_missing_and_unknown_fields() {
        // Forward-readable: extra fields ignored, absent ones defaulted.
        let raw = r#"{
            "tickets": {
                "3": {
                    "id": 3,
                    "user_id": "9",
                    "username": "bob",
                    "status": "closed",
                    "chat_id": "9",
                    "legacy_field": true
                }
            },
            "ticket_counter": 3,
            "schema": 2
        }"#;
        let book: TicketBook = serde_json::from_str(raw).unwrap();
        let ticket = &book.tickets[&3];
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert!(ticket.messages.is_empty());
        assert!(ticket.review_msg_id.is_none());
    }

    #[test]
    fn counter_is_strictly_increasing() {
        let mut book = TicketBook::default();
        let a = book.next_id();
        let b = book.next_id();
        assert!(b > a);
        assert_eq!((a, b), (1, 2));
    }
}
