//! Transport seam — the trait and inbound event model the router consumes.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::TransportError;

/// Stream of inbound transport events.
pub type EventStream = Pin<Box<dyn Stream<Item = InboundEvent> + Send>>;

/// A parsed `/command` with its argument tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

/// One inbound transport event.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Channel (chat) the event arrived on.
    pub channel_id: String,
    /// Stable sender identity.
    pub sender_id: String,
    /// Sender display name (first name on Telegram).
    pub sender_name: String,
    /// Sender handle, when the transport has one.
    pub sender_username: Option<String>,
    pub text: String,
    /// Token of the message this one replies to, if any.
    pub reply_to: Option<String>,
}

impl InboundEvent {
    pub fn new(
        channel_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            sender_id: sender_id.into(),
            sender_name: String::new(),
            sender_username: None,
            text: text.into(),
            reply_to: None,
        }
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.sender_username = Some(username.into());
        self
    }

    pub fn with_reply_to(mut self, token: impl Into<String>) -> Self {
        self.reply_to = Some(token.into());
        self
    }

    /// Parse a leading `/command`, stripping any `@botname` mention.
    ///
    /// Returns `None` for plain text and for a bare `/`.
    pub fn command(&self) -> Option<Command<'_>> {
        let text = self.text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);
        if name.is_empty() {
            return None;
        }
        Some(Command { name, args })
    }

    /// The sender's display name for agent-facing text: handle when the
    /// transport has one, first name otherwise.
    pub fn display_name(&self) -> &str {
        self.sender_username.as_deref().unwrap_or(&self.sender_name)
    }
}

/// A messaging transport the router receives from and sends through.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Start receiving; returns the inbound event stream.
    async fn start(&self) -> Result<EventStream, TransportError>;

    /// Send `text` to a channel, optionally as a threaded reply.
    ///
    /// Returns the transport's token for the sent message; the router
    /// stores it as a ticket's correlation token.
    async fn send(
        &self,
        channel_id: &str,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<String, TransportError>;

    /// Verify the transport is reachable before entering the event loop.
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Graceful shutdown.
    async fn shutdown(&self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> InboundEvent {
        InboundEvent::new("100", "100", text)
    }

    #[test]
    fn command_with_args() {
        let ev = event("/close 41");
        let cmd = ev.command().unwrap();
        assert_eq!(cmd.name, "close");
        assert_eq!(cmd.args, "41");
    }

    #[test]
    fn command_without_args() {
        let ev = event("/start");
        let cmd = ev.command().unwrap();
        assert_eq!(cmd.name, "start");
        assert_eq!(cmd.args, "");
    }

    #[test]
    fn command_strips_bot_mention() {
        let ev = event("/ticket@support_bot");
        let cmd = ev.command().unwrap();
        assert_eq!(cmd.name, "ticket");
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(event("hello there").command().is_none());
        assert!(event("close 41").command().is_none());
    }

    #[test]
    fn bare_slash_is_not_a_command() {
        assert!(event("/").command().is_none());
    }

    #[test]
    fn command_args_are_trimmed() {
        let ev = event("/close   41  ");
        let cmd = ev.command().unwrap();
        assert_eq!(cmd.args, "41");
    }

    #[test]
    fn display_name_prefers_username() {
        let ev = event("hi").with_sender_name("Alice").with_username("alice42");
        assert_eq!(ev.display_name(), "alice42");

        let ev = event("hi").with_sender_name("Alice");
        assert_eq!(ev.display_name(), "Alice");
    }
}
