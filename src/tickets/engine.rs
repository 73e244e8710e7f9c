//! Ticket lifecycle engine — creates, appends to, and closes tickets.
//!
//! Every operation is one load-modify-save cycle against the record
//! store, serialized behind a single mutex so the ID counter and the
//! ticket map always commit together. That keeps IDs unique and the
//! at-most-one-open-ticket-per-chat invariant intact even if event
//! handling is ever parallelized.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::TicketError;
use crate::store::RecordStore;
use crate::tickets::index;
use crate::tickets::model::{MessageEntry, Ticket, TicketStatus};

/// Identity a lifecycle operation acts for (user or agent).
#[derive(Debug, Clone)]
pub struct UserRef {
    pub id: String,
    pub display_name: String,
}

/// Where a recorded agent reply should be forwarded.
#[derive(Debug, Clone)]
pub struct ReplyTarget {
    pub ticket_id: u64,
    pub chat_id: String,
}

/// The lifecycle engine. Owns the store handle; all mutations go through
/// here.
pub struct TicketEngine {
    store: Arc<dyn RecordStore>,
    /// Guards every load-modify-save cycle.
    write_lock: Mutex<()>,
}

impl TicketEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a new open ticket, optionally seeded with one user message.
    ///
    /// Always allocates a fresh ID — callers decide whether an existing
    /// open ticket should have been reused instead.
    pub async fn create_ticket(
        &self,
        user: &UserRef,
        chat_id: &str,
        seed_text: Option<&str>,
    ) -> Result<u64, TicketError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.store.load().await?;

        let id = book.next_id();
        let messages = seed_text.map(MessageEntry::user).into_iter().collect();
        book.tickets.insert(
            id,
            Ticket {
                id,
                user_id: user.id.clone(),
                username: user.display_name.clone(),
                status: TicketStatus::Open,
                messages,
                chat_id: chat_id.to_string(),
                review_msg_id: None,
            },
        );
        self.store.save(&book).await?;

        info!(ticket = id, chat = chat_id, "Ticket created");
        Ok(id)
    }

    /// Append a user message to an open ticket.
    pub async fn append_user_message(&self, ticket_id: u64, text: &str) -> Result<(), TicketError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.store.load().await?;

        let ticket = book
            .tickets
            .get_mut(&ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?;
        if !ticket.is_open() {
            return Err(TicketError::Closed(ticket_id));
        }
        ticket.messages.push(MessageEntry::user(text));
        self.store.save(&book).await?;
        Ok(())
    }

    /// Resolve an agent reply through its correlation token and record it.
    ///
    /// The entry is persisted here, before any forward attempt, so a
    /// transport failure afterwards cannot lose it.
    pub async fn append_agent_reply(
        &self,
        token: &str,
        text: &str,
        agent: &UserRef,
    ) -> Result<ReplyTarget, TicketError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.store.load().await?;

        let Some(ticket) = index::find_by_review_token_mut(&mut book, token) else {
            return Err(TicketError::CorrelationFailed);
        };
        if !ticket.is_open() {
            return Err(TicketError::Closed(ticket.id));
        }

        ticket
            .messages
            .push(MessageEntry::agent(text, &agent.id, &agent.display_name));
        let target = ReplyTarget {
            ticket_id: ticket.id,
            chat_id: ticket.chat_id.clone(),
        };
        self.store.save(&book).await?;

        info!(ticket = target.ticket_id, agent = %agent.display_name, "Agent reply recorded");
        Ok(target)
    }

    /// Close a ticket by ID. Returns the originating chat so the caller
    /// can notify the user.
    ///
    /// Closing an already-closed ticket is a distinct, non-fatal outcome
    /// (`AlreadyClosed`), not a silent no-op and not `NotFound`.
    pub async fn close_ticket(&self, ticket_id: u64) -> Result<String, TicketError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.store.load().await?;

        let ticket = book
            .tickets
            .get_mut(&ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?;
        if !ticket.is_open() {
            return Err(TicketError::AlreadyClosed(ticket_id));
        }
        ticket.status = TicketStatus::Closed;
        let chat_id = ticket.chat_id.clone();
        self.store.save(&book).await?;

        info!(ticket = ticket_id, "Ticket closed");
        Ok(chat_id)
    }

    /// Record the review-channel correlation token for a ticket.
    ///
    /// Set exactly once, immediately after the review notification
    /// succeeds, and persisted before any reply can correlate. A second
    /// attach is refused — it can only come from a routing bug.
    pub async fn attach_review_token(
        &self,
        ticket_id: u64,
        token: &str,
    ) -> Result<(), TicketError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.store.load().await?;

        let ticket = book
            .tickets
            .get_mut(&ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?;
        if ticket.review_msg_id.is_some() {
            warn!(ticket = ticket_id, "Review token already attached; keeping the original");
            return Ok(());
        }
        ticket.review_msg_id = Some(token.to_string());
        self.store.save(&book).await?;
        Ok(())
    }

    /// Snapshot of the open ticket for a chat, if any.
    pub async fn open_ticket_for_chat(&self, chat_id: &str) -> Result<Option<Ticket>, TicketError> {
        let book = self.store.load().await?;
        Ok(index::find_open_ticket(&book, chat_id).cloned())
    }

    /// Snapshot of a single ticket.
    pub async fn ticket(&self, ticket_id: u64) -> Result<Option<Ticket>, TicketError> {
        let book = self.store.load().await?;
        Ok(book.tickets.get(&ticket_id).cloned())
    }
}
