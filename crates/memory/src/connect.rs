//! Backend selection by database URL, and the guarded startup connection.

use std::sync::Arc;

use careerlens_core::error::StoreError;
use careerlens_core::memory::ReflectionStore;
use tracing::info;

use crate::guard::{ConnectionGuard, Sleeper};
use crate::in_memory::InMemoryStore;

/// Open a store for `url` without retrying.
///
/// Supported schemes: `sqlite:` (feature `sqlite`), `postgres://` /
/// `postgresql://` (feature `postgres`) and `memory://`.
pub async fn open_store(
    url: &str,
    max_connections: u32,
) -> Result<Arc<dyn ReflectionStore>, StoreError> {
    if url.starts_with("memory:") {
        return Ok(Arc::new(InMemoryStore::new()));
    }

    if url.starts_with("sqlite:") {
        #[cfg(feature = "sqlite")]
        {
            let store = crate::sqlite::SqliteStore::connect(url, max_connections).await?;
            return Ok(Arc::new(store));
        }
        #[cfg(not(feature = "sqlite"))]
        {
            return Err(StoreError::Operation(
                "SQLite support not compiled in (enable the `sqlite` feature)".into(),
            ));
        }
    }

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        #[cfg(feature = "postgres")]
        {
            let store = crate::postgres::PostgresStore::connect(url, max_connections).await?;
            return Ok(Arc::new(store));
        }
        #[cfg(not(feature = "postgres"))]
        {
            return Err(StoreError::Operation(
                "PostgreSQL support not compiled in (enable the `postgres` feature)".into(),
            ));
        }
    }

    #[cfg(not(any(feature = "sqlite", feature = "postgres")))]
    let _ = max_connections;
    Err(StoreError::Operation(format!(
        "Unsupported database URL scheme: {}",
        url.split(':').next().unwrap_or_default()
    )))
}

/// Open the store under the connection guard and prove it answers a ping.
///
/// Returns only once the store is ready; the caller must treat an error
/// as fatal and refuse to serve.
pub async fn connect_store<S: Sleeper>(
    guard: &ConnectionGuard<S>,
    url: &str,
    max_connections: u32,
) -> Result<Arc<dyn ReflectionStore>, StoreError> {
    let store = guard
        .ensure_ready(|attempt| async move {
            info!(attempt, "Connecting to reflection store");
            let store = open_store(url, max_connections).await?;
            store.ping().await?;
            Ok(store)
        })
        .await?;

    info!(backend = store.name(), "Reflection store ready");
    Ok(store)
}
