//! Book persistence over the key-value store.
//!
//! Each record is a JSON document under `libro:<id>`. There are no indexes;
//! listing scans the namespace and filters in process.

use std::sync::Arc;

use shelf_store::KvBackend;
use thiserror::Error;

use super::models::{Book, BookInput, NewBook};

/// Namespace prefix shared by every book key.
pub const KEY_PREFIX: &str = "libro:";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error("stored value under '{key}' is not a valid book")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("book could not be encoded")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Handle to the book records, cheap to clone into every request.
#[derive(Clone)]
pub struct BookStore {
    backend: Arc<dyn KvBackend>,
}

impl BookStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    /// Checks that the underlying store answers.
    pub async fn ping(&self) -> Result<()> {
        Ok(self.backend.ping().await?)
    }

    /// Lists every book, keeping only title/author matches when `query` is
    /// non-empty. Keys that vanish or hold undecodable values mid-scan are
    /// skipped.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Book>> {
        let needle = query
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let keys = self.backend.scan(KEY_PREFIX).await?;
        let mut books = Vec::with_capacity(keys.len());

        for key in keys {
            let Some(raw) = self.backend.get(&key).await? else {
                continue;
            };
            let book: Book = match serde_json::from_slice(&raw) {
                Ok(book) => book,
                Err(err) => {
                    tracing::debug!(%key, error = %err, "skipping undecodable book record");
                    continue;
                }
            };
            if needle.as_deref().map_or(true, |n| book.matches(n)) {
                books.push(book);
            }
        }

        Ok(books)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Book>> {
        let key = Self::key(id);
        match self.backend.get(&key).await? {
            Some(raw) => decode(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.backend.exists(&Self::key(id)).await?)
    }

    /// Assigns a fresh id and persists the record.
    pub async fn create(&self, new_book: NewBook) -> Result<Book> {
        let book = new_book.with_id(uuid::Uuid::new_v4().to_string());

        self.put(&book).await?;
        tracing::info!(id = %book.id, "book created");
        Ok(book)
    }

    /// Merges `input` over the stored record. Returns `None` if the book does
    /// not exist. Concurrent updates to one id race; the last write wins.
    pub async fn update(&self, id: &str, input: BookInput) -> Result<Option<Book>> {
        let Some(mut book) = self.get(id).await? else {
            return Ok(None);
        };

        input.apply_to(&mut book);
        // The key, not the stored document, is authoritative for the id.
        book.id = id.to_string();

        self.put(&book).await?;
        tracing::info!(%id, "book updated");
        Ok(Some(book))
    }

    /// Removes the record; `false` if there was nothing to remove.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.backend.delete(&Self::key(id)).await?;
        if removed {
            tracing::info!(%id, "book deleted");
        }
        Ok(removed)
    }

    async fn put(&self, book: &Book) -> Result<()> {
        let raw = serde_json::to_vec(book).map_err(RepositoryError::Encode)?;
        self.backend.set(&Self::key(&book.id), raw).await?;
        Ok(())
    }
}

fn decode(key: &str, raw: &[u8]) -> Result<Book> {
    serde_json::from_slice(raw).map_err(|source| RepositoryError::Corrupt {
        key: key.to_string(),
        source,
    })
}
