//! Transport abstraction for message I/O.

pub mod telegram;
pub mod transport;

pub use telegram::TelegramTransport;
pub use transport::{Command, EventStream, InboundEvent, Transport};
