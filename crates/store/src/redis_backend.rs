//! Redis/KeyDB storage backend.
//!
//! The connection is established lazily through a shared
//! [`ConnectionManager`]; until the first successful connect, every call
//! makes a fresh attempt, so a store that is down at startup is picked up
//! once it comes back. Connection attempts are never retried within a call:
//! an unreachable store fails the request promptly.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use shelf_kernel::settings::StoreSettings;

use super::backend::{KvBackend, ScanPage};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

fn manager_config() -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(0)
        .set_connection_timeout(CONNECT_TIMEOUT)
        .set_response_timeout(RESPONSE_TIMEOUT)
}

/// Key-value backend speaking the Redis protocol (Redis, KeyDB, Valkey).
pub struct RedisBackend {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    scan_count: usize,
    address: String,
}

impl RedisBackend {
    /// Builds a backend for the configured address without connecting.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be turned into a connection URL.
    pub fn open(settings: &StoreSettings) -> Result<Self> {
        let client = redis::Client::open(connection_url(settings))
            .with_context(|| format!("invalid store address {}:{}", settings.host, settings.port))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            scan_count: settings.scan_count.max(1),
            address: format!("{}:{}", settings.host, settings.port),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                tracing::debug!(address = %self.address, "connecting to key-value store");
                ConnectionManager::new_with_config(self.client.clone(), manager_config())
                    .await
            })
            .await
            .with_context(|| format!("failed to connect to key-value store at {}", self.address))?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .with_context(|| format!("GET {key} failed"))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set(key, value)
            .await
            .with_context(|| format!("SET {key} failed"))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .with_context(|| format!("DEL {key} failed"))?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let found: bool = conn
            .exists(key)
            .await
            .with_context(|| format!("EXISTS {key} failed"))?;
        Ok(found)
    }

    async fn scan_page(&self, cursor: u64, prefix: &str) -> Result<ScanPage> {
        let mut conn = self.connection().await?;
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(match_pattern(prefix))
            .arg("COUNT")
            .arg(self.scan_count)
            .query_async(&mut conn)
            .await
            .with_context(|| format!("SCAN {cursor} MATCH {prefix}* failed"))?;

        Ok(ScanPage { cursor: next, keys })
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("PING failed")?;
        Ok(())
    }
}

fn connection_url(settings: &StoreSettings) -> String {
    match settings.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => format!(
            "redis://:{}@{}:{}/",
            utf8_percent_encode(password, NON_ALPHANUMERIC),
            settings.host,
            settings.port
        ),
        None => format!("redis://{}:{}/", settings.host, settings.port),
    }
}

/// Glob pattern matching every key that starts with `prefix` literally.
fn match_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}
