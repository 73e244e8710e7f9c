//! `RecordStore` trait — the persistence seam for the ticket book.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::tickets::model::TicketBook;

/// Backend-agnostic store holding the single ticket document.
///
/// `load` and `save` bracket every mutation as one read-modify-write
/// unit. Serializing those units is the caller's job — the lifecycle
/// engine holds one lock around each cycle.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the ticket book.
    ///
    /// An absent or corrupt document loads as the empty default — never
    /// a fatal startup error. Errors only on genuine I/O failure.
    async fn load(&self) -> Result<TicketBook, StoreError>;

    /// Persist the ticket book.
    ///
    /// All-or-nothing: a failed save leaves the previously persisted
    /// document intact.
    async fn save(&self, book: &TicketBook) -> Result<(), StoreError>;
}
