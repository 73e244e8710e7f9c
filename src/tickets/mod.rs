//! Ticket routing and correlation core.

pub mod engine;
pub mod index;
pub mod model;

pub use engine::{TicketEngine, UserRef};
pub use model::{MessageEntry, Ticket, TicketBook, TicketStatus};
