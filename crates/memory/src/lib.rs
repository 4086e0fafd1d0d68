//! Reflection store implementations for CareerLens.
//!
//! All stores implement `careerlens_core::ReflectionStore`. The
//! [`guard`] module holds the startup connection probe.

pub mod connect;
pub mod guard;
pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use connect::{connect_store, open_store};
pub use guard::{ConnectionGuard, GuardState, Sleeper, TokioSleeper};
pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// Map a sqlx failure onto the store taxonomy.
///
/// Failures to reach the server (I/O, TLS, pool exhaustion or shutdown)
/// are connection errors and may be retried at startup; everything else
/// is an operation error.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub(crate) fn classify(context: &str, e: sqlx::Error) -> careerlens_core::StoreError {
    use careerlens_core::StoreError;

    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(format!("{context}: {e}")),
        other => StoreError::Operation(format!("{context}: {other}")),
    }
}
