//! Correlation lookups derived from the ticket book.
//!
//! Both are O(n) scans over the loaded document. That's fine at
//! support-bot scale, and it means there is never a second source of
//! truth that can drift from the store.

use crate::tickets::model::{Ticket, TicketBook};

/// Find the open ticket originating from `chat_id`, if any.
///
/// Scans in ascending ID order, so when explicit `/ticket` creation has
/// produced more than one open ticket for a chat, the oldest one wins —
/// deterministically.
pub fn find_open_ticket<'a>(book: &'a TicketBook, chat_id: &str) -> Option<&'a Ticket> {
    book.tickets
        .values()
        .find(|t| t.chat_id == chat_id && t.is_open())
}

/// Find the ticket whose review-channel correlation token is `token`.
pub fn find_by_review_token<'a>(book: &'a TicketBook, token: &str) -> Option<&'a Ticket> {
    book.tickets
        .values()
        .find(|t| t.review_msg_id.as_deref() == Some(token))
}

/// Mutable variant of [`find_by_review_token`], for the append path.
pub fn find_by_review_token_mut<'a>(
    book: &'a mut TicketBook,
    token: &str,
) -> Option<&'a mut Ticket> {
    book.tickets
        .values_mut()
        .find(|t| t.review_msg_id.as_deref() == Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::model::TicketStatus;

    fn ticket(id: u64, chat_id: &str, status: TicketStatus, token: Option<&str>) -> Ticket {
        Ticket {
            id,
            user_id: chat_id.to_string(),
            username: "user".into(),
            status,
            messages: Vec::new(),
            chat_id: chat_id.to_string(),
            review_msg_id: token.map(String::from),
        }
    }

    fn book_with(tickets: Vec<Ticket>) -> TicketBook {
        let mut book = TicketBook::default();
        for t in tickets {
            book.ticket_counter = book.ticket_counter.max(t.id);
            book.tickets.insert(t.id, t);
        }
        book
    }

    #[test]
    fn open_ticket_skips_closed() {
        let book = book_with(vec![
            ticket(1, "42", TicketStatus::Closed, None),
            ticket(2, "42", TicketStatus::Open, None),
        ]);
        assert_eq!(find_open_ticket(&book, "42").map(|t| t.id), Some(2));
    }

    #[test]
    fn open_ticket_matches_chat() {
        let book = book_with(vec![ticket(1, "42", TicketStatus::Open, None)]);
        assert!(find_open_ticket(&book, "99").is_none());
    }

    #[test]
    fn open_ticket_prefers_lowest_id() {
        let book = book_with(vec![
            ticket(2, "42", TicketStatus::Open, None),
            ticket(1, "42", TicketStatus::Open, None),
        ]);
        assert_eq!(find_open_ticket(&book, "42").map(|t| t.id), Some(1));
    }

    #[test]
    fn review_token_lookup() {
        let book = book_with(vec![
            ticket(1, "42", TicketStatus::Open, Some("555")),
            ticket(2, "43", TicketStatus::Open, None),
        ]);
        assert_eq!(find_by_review_token(&book, "555").map(|t| t.id), Some(1));
        assert!(find_by_review_token(&book, "556").is_none());
    }

    #[test]
    fn tokenless_ticket_never_correlates() {
        let book = book_with(vec![ticket(1, "42", TicketStatus::Open, None)]);
        assert!(find_by_review_token(&book, "").is_none());
    }
}
