//! Key-value store backends for shelf.
//!
//! - **RedisBackend**: Redis/KeyDB over the network (production)
//! - **MemoryBackend**: non-persistent, in-process (development and tests)

mod backend;
mod memory;
mod redis_backend;

use std::sync::Arc;

use shelf_kernel::settings::{StoreBackend, StoreSettings};

pub use backend::{KvBackend, ScanPage, SCAN_START};
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;

/// Builds the configured backend. Construction never touches the network;
/// reachability is checked separately through [`KvBackend::ping`].
///
/// # Errors
///
/// Returns an error if the configured address is malformed.
pub fn connect(settings: &StoreSettings) -> anyhow::Result<Arc<dyn KvBackend>> {
    match settings.backend {
        StoreBackend::Redis => {
            tracing::info!(
                target: "shelf-store",
                host = %settings.host,
                port = settings.port,
                "using redis key-value store"
            );
            Ok(Arc::new(RedisBackend::open(settings)?))
        }
        StoreBackend::Memory => {
            tracing::warn!(
                target: "shelf-store",
                "using in-memory key-value store; data is lost on exit"
            );
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Reports every key on two consecutive pages, the way a rehashing
    /// Redis SCAN may.
    struct RepeatingBackend;

    #[async_trait]
    impl KvBackend for RepeatingBackend {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> anyhow::Result<()> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn scan_page(&self, cursor: u64, _prefix: &str) -> anyhow::Result<ScanPage> {
            Ok(match cursor {
                SCAN_START => ScanPage {
                    cursor: 7,
                    keys: vec!["a".to_string(), "b".to_string()],
                },
                7 => ScanPage {
                    cursor: 9,
                    keys: Vec::new(),
                },
                _ => ScanPage {
                    cursor: SCAN_START,
                    keys: vec!["b".to_string(), "c".to_string()],
                },
            })
        }
    }

    #[tokio::test]
    async fn test_scan_follows_cursor_and_dedupes() {
        let keys = RepeatingBackend.scan("").await.unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let settings = StoreSettings {
            backend: StoreBackend::Memory,
            ..StoreSettings::default()
        };
        let store = connect(&settings).unwrap();

        store.set("libro:1", b"{}".to_vec()).await.unwrap();
        assert!(store.exists("libro:1").await.unwrap());
        store.ping().await.unwrap();
    }

    #[test]
    fn test_connect_redis_backend_is_lazy() {
        let settings = StoreSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..StoreSettings::default()
        };
        assert!(connect(&settings).is_ok());
    }
}
