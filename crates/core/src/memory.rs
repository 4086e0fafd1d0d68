//! ReflectionStore trait: the durable, ordered log of reflections.
//!
//! Every read returns reflections newest first (`created_at` descending,
//! ties broken by the larger id).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::reflection::{NewReflection, Reflection};

/// The core ReflectionStore trait.
///
/// Implementations: SQLite, PostgreSQL, in-memory (for testing).
#[async_trait]
pub trait ReflectionStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "postgres", "in_memory").
    fn name(&self) -> &str;

    /// Append a reflection. Either the whole record is stored or nothing is.
    async fn append(&self, reflection: NewReflection) -> Result<Reflection, StoreError>;

    /// The entire history, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Reflection>, StoreError>;

    /// At most `limit` reflections, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<Reflection>, StoreError>;

    /// Number of stored reflections.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Cheap round trip proving the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
