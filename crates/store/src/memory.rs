//! In-memory KV storage backend.
//!
//! Non-persistent store built on DashMap. Used for development
//! (`store.backend = "memory"`) and throughout the test suites.

use super::backend::{KvBackend, ScanPage, SCAN_START};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory key-value storage backend using DashMap.
///
/// All data is lost when the process exits. Scans page through the matching
/// keys in sorted order; the cursor is the offset of the next page.
#[derive(Debug)]
pub struct MemoryBackend {
    data: DashMap<String, Vec<u8>>,
    page_size: usize,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates a backend whose scans return at most `page_size` keys per step.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            data: DashMap::new(),
            page_size: page_size.max(1),
        }
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.data.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }

    async fn scan_page(&self, cursor: u64, prefix: &str) -> Result<ScanPage> {
        let mut matching: Vec<String> = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        matching.sort_unstable();

        let start = usize::try_from(cursor).unwrap_or(usize::MAX).min(matching.len());
        let end = start.saturating_add(self.page_size).min(matching.len());
        let next = if end >= matching.len() {
            SCAN_START
        } else {
            end as u64
        };

        Ok(ScanPage {
            cursor: next,
            keys: matching[start..end].to_vec(),
        })
    }
}
