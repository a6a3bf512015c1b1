//! Best-effort persistence of resolved searches.
//!
//! Writes run on a detached task. A failed write is logged and otherwise
//! ignored; it never reaches the request that triggered it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::Coordinate;

pub mod sqlite;

pub use sqlite::SqliteSearchLog;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLogEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SearchLogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Append-only sink for search log entries.
#[async_trait]
pub trait SearchLogStore: Send + Sync + Debug {
    async fn append(&self, entry: &SearchLogEntry) -> Result<(), SearchLogError>;
}

/// Fire-and-forget front of a [`SearchLogStore`].
#[derive(Debug, Clone, Default)]
pub struct SearchLogger {
    store: Option<Arc<dyn SearchLogStore>>,
}

impl SearchLogger {
    pub fn new(store: Arc<dyn SearchLogStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Spawn the write for one resolved search and return immediately.
    ///
    /// The entry is timestamped when the task runs. Returns `None` when
    /// logging is disabled.
    pub fn record(&self, coordinate: &Coordinate, place_name: &str) -> Option<JoinHandle<()>> {
        let store = Arc::clone(self.store.as_ref()?);
        let (latitude, longitude) = coordinate.parsed();
        let place_name = place_name.to_string();

        Some(tokio::spawn(async move {
            let entry = SearchLogEntry { latitude, longitude, place_name, searched_at: Utc::now() };

            match store.append(&entry).await {
                Ok(()) => debug!(place = %entry.place_name, "search logged"),
                Err(e) => warn!(error = %e, place = %entry.place_name, "failed to log search"),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BrokenStore, InMemorySearchLog};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn record_appends_entry() {
        let store = Arc::new(InMemorySearchLog::new());
        let logger = SearchLogger::new(store.clone());

        let before = Utc::now();
        logger
            .record(&Coordinate::new("52.52", "13.41"), "Berlin, Germany")
            .expect("logging enabled")
            .await
            .unwrap();

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].latitude, 52.52);
        assert_eq!(entries[0].longitude, 13.41);
        assert_eq!(entries[0].place_name, "Berlin, Germany");
        assert!(entries[0].searched_at >= before);
    }

    #[tokio::test]
    async fn failing_store_is_swallowed() {
        let store = Arc::new(BrokenStore::default());
        let logger = SearchLogger::new(store.clone());

        let handle = logger.record(&Coordinate::new("1", "2"), "X").unwrap();
        assert!(handle.await.is_ok());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_logger_spawns_nothing() {
        let logger = SearchLogger::disabled();
        assert!(!logger.is_enabled());
        assert!(logger.record(&Coordinate::new("1", "2"), "X").is_none());
    }
}
