//! Persistence for the ticket book.

pub mod json_backend;
pub mod traits;

pub use json_backend::JsonStore;
pub use traits::RecordStore;
