//! Ticket Relay — routes support conversations between end users and a
//! shared review channel over a messaging transport.

pub mod channels;
pub mod config;
pub mod error;
pub mod router;
pub mod store;
pub mod tickets;
