use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use tracing::{info, instrument};

use super::{SearchLogEntry, SearchLogError, SearchLogStore};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS search_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    latitude REAL,
    longitude REAL,
    place_name TEXT NOT NULL,
    searched_at TEXT NOT NULL
)";

/// SQLite-backed search log.
#[derive(Debug, Clone)]
pub struct SqliteSearchLog {
    pool: SqlitePool,
}

impl SqliteSearchLog {
    /// Open (creating if needed) the database at `url` and ensure the table
    /// exists. `sqlite::memory:` gives a private in-memory database.
    pub async fn connect(url: &str) -> Result<Self, SearchLogError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:");

        let pool = SqlitePoolOptions::new()
            // Every connection to :memory: is its own database.
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!(%url, "search log ready");

        Ok(Self { pool })
    }

    pub async fn count(&self) -> Result<i64, SearchLogError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl SearchLogStore for SqliteSearchLog {
    #[instrument(skip(self, entry), fields(place = %entry.place_name))]
    async fn append(&self, entry: &SearchLogEntry) -> Result<(), SearchLogError> {
        sqlx::query(
            "INSERT INTO search_log (latitude, longitude, place_name, searched_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(finite(entry.latitude))
        .bind(finite(entry.longitude))
        .bind(&entry.place_name)
        .bind(entry.searched_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// SQLite has no NaN; unparseable coordinates are stored as NULL.
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
