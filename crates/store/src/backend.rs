//! Backend trait for the key-value store.
//!
//! Defines the primitives the book repository relies on: point reads and
//! writes plus an incremental, cursor-driven key scan.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

/// Cursor value that starts a scan and, when returned, marks its end.
pub const SCAN_START: u64 = 0;

/// One step of an incremental key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next step; [`SCAN_START`] once the scan is complete.
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Backend trait for key-value storage.
///
/// All backends must be thread-safe (`Send + Sync`) so a single handle can
/// serve every request handler.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a value, overwriting any existing value for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Deletes a key.
    ///
    /// Returns `Ok(true)` if the key existed and was removed,
    /// `Ok(false)` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Checks if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may override
    /// for efficiency.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Performs one step of a scan over keys starting with `prefix`.
    ///
    /// Start with [`SCAN_START`] and feed each returned cursor back in until
    /// it comes back as [`SCAN_START`]. A step may return no keys without the
    /// scan being finished, and a key may be reported more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn scan_page(&self, cursor: u64, prefix: &str) -> Result<ScanPage>;

    /// Collects every key starting with `prefix` by driving [`scan_page`]
    /// to completion. Each key is returned once; order is unspecified.
    ///
    /// [`scan_page`]: KvBackend::scan_page
    ///
    /// # Errors
    ///
    /// Returns an error if any scan step fails.
    async fn scan(&self, prefix: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let mut cursor = SCAN_START;

        loop {
            let page = self.scan_page(cursor, prefix).await?;
            for key in page.keys {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
            if page.cursor == SCAN_START {
                break;
            }
            cursor = page.cursor;
        }

        Ok(keys)
    }

    /// Verifies the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
