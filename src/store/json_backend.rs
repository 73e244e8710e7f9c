//! JSON-file record store — a single flat document on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::store::traits::RecordStore;
use crate::tickets::model::TicketBook;

/// File-backed store persisting the ticket book as one JSON document.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for JsonStore {
    async fn load(&self) -> Result<TicketBook, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TicketBook::default());
            }
            Err(e) => return Err(StoreError::Read(e.to_string())),
        };

        match serde_json::from_slice(&raw) {
            Ok(book) => Ok(book),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ticket store unreadable; starting from an empty book"
                );
                Ok(TicketBook::default())
            }
        }
    }

    async fn save(&self, book: &TicketBook) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(book)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Write(e.to_string()))?;
        }

        // Write to a sibling temp file, then rename into place, so a
        // failed write never truncates the previous document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &raw)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::tickets::model::{MessageEntry, Ticket, TicketStatus};

    fn store_in(dir: &TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("data.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty_book() {
        let dir = TempDir::new().unwrap();
        let book = store_in(&dir).load().await.unwrap();
        assert_eq!(book.ticket_counter, 0);
        assert!(book.tickets.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_book() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.path(), b"{not json").await.unwrap();

        let book = store.load().await.unwrap();
        assert_eq!(book.ticket_counter, 0);
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut book = TicketBook::default();
        let id = book.next_id();
        book.tickets.insert(
            id,
            Ticket {
                id,
                user_id: "7".into(),
                username: "alice".into(),
                status: TicketStatus::Open,
                messages: vec![MessageEntry::user("hello")],
                chat_id: "7".into(),
                review_msg_id: None,
            },
        );
        store.save(&book).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.ticket_counter, 1);
        assert_eq!(loaded.tickets[&1].messages[0].text(), "hello");
    }

    #[tokio::test]
    async fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("nested/state/data.json"));
        store.save(&TicketBook::default()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&TicketBook::default()).await.unwrap();

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["data.json"]);
    }
}
