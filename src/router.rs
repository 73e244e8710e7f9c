//! Message router — classifies inbound events and drives the lifecycle
//! engine.
//!
//! Review-channel events are agent actions: a threaded reply correlates
//! back to a ticket through the stored review-message token, `/close`
//! resolves by ticket ID. Everything else is user traffic: commands,
//! canned phrases, or free text that lands on a ticket.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::channels::{InboundEvent, Transport};
use crate::config::BotConfig;
use crate::error::TicketError;
use crate::tickets::engine::{TicketEngine, UserRef};

pub struct Router {
    config: BotConfig,
    engine: Arc<TicketEngine>,
    transport: Arc<dyn Transport>,
}

impl Router {
    pub fn new(config: BotConfig, engine: Arc<TicketEngine>, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            engine,
            transport,
        }
    }

    /// Handle one inbound event to completion.
    ///
    /// Lifecycle outcomes are surfaced as reply text along the way; only
    /// a store failure aborts handling, and it is reported to the
    /// initiating channel as a generic failure.
    pub async fn handle_event(&self, event: InboundEvent) {
        debug!(
            channel = %event.channel_id,
            sender = %event.sender_id,
            "Inbound event"
        );

        let outcome = if event.channel_id == self.config.review_chat_id {
            self.handle_review_event(&event).await
        } else {
            self.handle_user_event(&event).await
        };

        if let Err(e) = outcome {
            error!(error = %e, channel = %event.channel_id, "Event handling aborted");
            self.notify(
                &event.channel_id,
                "⚠️ Something went wrong handling your message. Please try again.",
            )
            .await;
        }
    }

    // ── Review-channel events ───────────────────────────────────────

    async fn handle_review_event(&self, event: &InboundEvent) -> Result<(), TicketError> {
        if let Some(cmd) = event.command() {
            if cmd.name == "close" {
                return self.handle_close_command(cmd.args).await;
            }
            debug!(command = cmd.name, "Ignoring review-channel command");
            return Ok(());
        }

        if let Some(token) = event.reply_to.as_deref() {
            return self.handle_agent_reply(event, token).await;
        }

        // Untargeted review-channel chatter is not routed anywhere.
        Ok(())
    }

    async fn handle_close_command(&self, args: &str) -> Result<(), TicketError> {
        let review = &self.config.review_chat_id;

        // A missing or malformed ID is a user-input error, not a
        // lifecycle error.
        let Ok(ticket_id) = args.trim().parse::<u64>() else {
            self.notify(
                review,
                "❌ Please provide a valid ticket ID: /close <ticket_id>",
            )
            .await;
            return Ok(());
        };

        match self.engine.close_ticket(ticket_id).await {
            Ok(chat_id) => {
                self.notify(review, &format!("✅ Ticket #{ticket_id} has been closed."))
                    .await;

                let closure = format!(
                    "Your support ticket #{ticket_id} has been closed. If you have further \
                     questions, please open a new ticket using /ticket."
                );
                if let Err(e) = self.transport.send(&chat_id, &closure, None).await {
                    warn!(ticket = ticket_id, error = %e, "Failed to notify user about closure");
                    self.notify(review, &format!("⚠️ Failed to notify user: {e}"))
                        .await;
                }
            }
            Err(TicketError::AlreadyClosed(_)) => {
                self.notify(review, &format!("⚠️ Ticket #{ticket_id} is already closed."))
                    .await;
            }
            Err(TicketError::NotFound(_)) => {
                self.notify(review, &format!("❌ Ticket #{ticket_id} not found."))
                    .await;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn handle_agent_reply(
        &self,
        event: &InboundEvent,
        token: &str,
    ) -> Result<(), TicketError> {
        let review = &self.config.review_chat_id;
        let agent = sender_ref(event);

        match self.engine.append_agent_reply(token, &event.text, &agent).await {
            Ok(target) => {
                let forward = format!(
                    "💬 Support response for ticket #{}:\n\n{}",
                    target.ticket_id, event.text
                );
                match self.transport.send(&target.chat_id, &forward, None).await {
                    Ok(_) => {
                        self.notify(
                            review,
                            &format!("✅ Response sent to the user (Ticket #{})", target.ticket_id),
                        )
                        .await;
                    }
                    Err(e) => {
                        // The entry is already persisted; report the
                        // failure, never retry the mutation.
                        warn!(
                            ticket = target.ticket_id,
                            error = %e,
                            "Forward to user failed after reply was recorded"
                        );
                        self.notify(
                            review,
                            &format!(
                                "⚠️ Your reply was recorded on ticket #{} but could not be \
                                 delivered: {e}",
                                target.ticket_id
                            ),
                        )
                        .await;
                    }
                }
            }
            Err(TicketError::Closed(id)) => {
                self.notify(review, &format!("⚠️ Cannot reply: Ticket #{id} is closed."))
                    .await;
            }
            Err(TicketError::CorrelationFailed) => {
                self.notify(
                    review,
                    "❌ Could not find the associated ticket for this reply.",
                )
                .await;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    // ── User-channel events ─────────────────────────────────────────

    async fn handle_user_event(&self, event: &InboundEvent) -> Result<(), TicketError> {
        if let Some(cmd) = event.command() {
            return match cmd.name {
                "start" => {
                    self.notify(&event.channel_id, &self.config.welcome_message)
                        .await;
                    Ok(())
                }
                "faq" => {
                    self.notify(&event.channel_id, &self.config.faq_message())
                        .await;
                    Ok(())
                }
                "ticket" => self.handle_ticket_command(event).await,
                "close" => {
                    self.notify(&event.channel_id, "❌ Only administrators can close tickets.")
                        .await;
                    Ok(())
                }
                other => {
                    debug!(command = other, "Ignoring unknown user command");
                    Ok(())
                }
            };
        }

        // Canned phrases: greetings first, then the response table;
        // first match in fixed enumeration order wins.
        let lowered = event.text.to_lowercase();
        for greeting in &self.config.greetings {
            if lowered.contains(greeting.as_str()) {
                self.notify(&event.channel_id, &self.config.welcome_message)
                    .await;
                return Ok(());
            }
        }
        for (phrase, response) in &self.config.canned_responses {
            if lowered.contains(phrase.as_str()) {
                self.notify(&event.channel_id, response).await;
                return Ok(());
            }
        }

        self.handle_free_text(event).await
    }

    /// Explicit `/ticket` always allocates a fresh ticket, even when one
    /// is already open for this chat; only implicit free-text creation
    /// reuses an open ticket. Intentional asymmetry, carried over from
    /// the original behavior — do not unify the two paths.
    async fn handle_ticket_command(&self, event: &InboundEvent) -> Result<(), TicketError> {
        let user = sender_ref(event);
        let ticket_id = self
            .engine
            .create_ticket(&user, &event.channel_id, None)
            .await?;

        self.notify(
            &event.channel_id,
            &self.config.ticket_created_message(ticket_id),
        )
        .await;

        self.post_review_notification(event, ticket_id, None).await
    }

    async fn handle_free_text(&self, event: &InboundEvent) -> Result<(), TicketError> {
        if let Some(ticket) = self.engine.open_ticket_for_chat(&event.channel_id).await? {
            self.engine.append_user_message(ticket.id, &event.text).await?;

            let forward = format!(
                "💬 Message from user (Ticket #{}):\n{}\n\nReply to the original ticket \
                 message to respond.",
                ticket.id, event.text
            );
            if let Err(e) = self
                .transport
                .send(
                    &self.config.review_chat_id,
                    &forward,
                    ticket.review_msg_id.as_deref(),
                )
                .await
            {
                warn!(ticket = ticket.id, error = %e, "Failed to forward user message");
                self.notify(
                    &event.channel_id,
                    &format!(
                        "⚠️ Your message was recorded on ticket #{} but could not be \
                         delivered to the support team.",
                        ticket.id
                    ),
                )
                .await;
            }
            return Ok(());
        }

        // No open ticket: implicitly create one seeded with this message.
        let user = sender_ref(event);
        let ticket_id = self
            .engine
            .create_ticket(&user, &event.channel_id, Some(&event.text))
            .await?;

        self.notify(
            &event.channel_id,
            &format!(
                "I've created a support ticket #{ticket_id} with your message. Our team will \
                 get back to you soon!"
            ),
        )
        .await;

        self.post_review_notification(event, ticket_id, Some(&event.text))
            .await
    }

    /// Post the new-ticket notification to the review channel and store
    /// the resulting message token for reply correlation.
    ///
    /// When the notification fails, the ticket stays tokenless and can
    /// never receive a routed agent reply — known limitation, no retry
    /// or backfill.
    async fn post_review_notification(
        &self,
        event: &InboundEvent,
        ticket_id: u64,
        seed_text: Option<&str>,
    ) -> Result<(), TicketError> {
        let mut notification = format!(
            "🎫 New Ticket #{ticket_id} 🎫\nFrom: {}\n",
            event.display_name()
        );
        if let Some(text) = seed_text {
            notification.push_str(&format!("Message: {text}\n"));
        }
        notification.push_str("\nReply to this message to respond to the ticket.");

        match self
            .transport
            .send(&self.config.review_chat_id, &notification, None)
            .await
        {
            Ok(token) => self.engine.attach_review_token(ticket_id, &token).await,
            Err(e) => {
                error!(
                    ticket = ticket_id,
                    error = %e,
                    "Failed to post ticket notification to review channel"
                );
                self.notify(&event.channel_id, "Error: Could not notify administrators")
                    .await;
                Ok(())
            }
        }
    }

    /// Send a message, logging (but not escalating) transport failures.
    async fn notify(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.transport.send(chat_id, text, None).await {
            warn!(chat = chat_id, error = %e, "Failed to deliver notification");
        }
    }
}

/// The event sender as a lifecycle identity: handle preferred over
/// display name, matching what agents see in ticket headers.
fn sender_ref(event: &InboundEvent) -> UserRef {
    UserRef {
        id: event.sender_id.clone(),
        display_name: event.display_name().to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
