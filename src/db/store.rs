use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, SqliteConnection,
};
use tracing::{debug, error, info, warn};

use crate::db::documents::Document;
use crate::error::StoreError;
use crate::models::{PlayByPlaySnapshot, DEFAULT_PLAY_LIMIT};

/// Reconnect attempts a session makes before reporting failure
const MAX_RECONNECTS: u32 = 1;

/// How long a session waits for a pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed document store.
///
/// Every snapshot kind lives in one `documents` table, addressed by
/// (database, collection, natural key), with the snapshot as a JSON body.
#[derive(Clone)]
pub struct DocumentStore {
    pool: Pool<Sqlite>,
}

/// Whether a save inserted a new document or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Replaced,
}

impl DocumentStore {
    /// Create a new document store and initialize the schema
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create data directory if needed
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if !is_in_memory(database_url) {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .context("Failed to create database directory")?;
                    }
                }
            }
        }

        // Parse connection options and enable create_if_missing
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true);

        // An in-memory database lives only as long as its single connection
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Document store initialized");
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                db_name TEXT NOT NULL,
                collection_name TEXT NOT NULL,
                doc_key TEXT NOT NULL,
                body TEXT NOT NULL,
                retrieved_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (db_name, collection_name, doc_key)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_retrieved
            ON documents (db_name, collection_name, retrieved_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Open a scoped session; its connection is acquired on first use
    pub fn session(&self) -> Session {
        Session {
            pool: self.pool.clone(),
            conn: None,
        }
    }

    /// Check the store answers a trivial query
    pub async fn ping(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Document store ping failed: {}", e);
                false
            }
        }
    }

    /// Close the pool; sessions opened afterwards report every operation as failed
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Document store closed");
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A unit of work against the store holding at most one pooled connection.
///
/// The connection returns to the pool when the session is closed or dropped,
/// whether or not its operations succeeded. Operations never return errors:
/// failures are logged and reported as `false` or `None`.
pub struct Session {
    pool: Pool<Sqlite>,
    conn: Option<PoolConnection<Sqlite>>,
}

impl Session {
    /// Acquire the connection lazily
    async fn connection(&mut self) -> Result<&mut SqliteConnection, StoreError> {
        if self.conn.is_none() {
            let conn = self.pool.acquire().await.map_err(StoreError::from_sqlx)?;
            debug!("Store session acquired connection");
            self.conn = Some(conn);
        }

        match self.conn.as_mut() {
            Some(conn) => Ok(&mut **conn),
            None => Err(StoreError::Unavailable(sqlx::Error::PoolClosed)),
        }
    }

    /// Drop a broken connection and allow one more attempt
    fn should_retry(&mut self, err: &StoreError, attempt: &mut u32, op: &str) -> bool {
        if !err.is_connection() || *attempt >= MAX_RECONNECTS {
            return false;
        }
        *attempt += 1;
        warn!(
            "Store {} failed ({}), reconnecting (attempt {}/{})",
            op, err, attempt, MAX_RECONNECTS
        );
        self.conn = None;
        true
    }

    /// Upsert a document by its natural key; true on success
    pub async fn save<D: Document>(&mut self, doc: &D) -> bool {
        let key = doc.natural_key();
        let body = match serde_json::to_string(doc) {
            Ok(body) => body,
            Err(e) => {
                error!("{}", StoreError::Encode(e));
                return false;
            }
        };
        let retrieved_at = timestamp(doc.retrieved_at());

        let mut attempt = 0;
        let result = loop {
            let result = self
                .try_save(D::DATABASE, D::COLLECTION, &key, &body, &retrieved_at)
                .await;
            match result {
                Err(e) if self.should_retry(&e, &mut attempt, "save") => continue,
                other => break other,
            }
        };

        match result {
            Ok(SaveOutcome::Replaced) => {
                info!("Updated {} record with {}={}", D::COLLECTION, D::KEY_FIELD, key);
                true
            }
            Ok(SaveOutcome::Inserted) => {
                info!("Inserted {} record with {}={}", D::COLLECTION, D::KEY_FIELD, key);
                true
            }
            Err(e) => {
                error!("Error saving {} {}={}: {}", D::COLLECTION, D::KEY_FIELD, key, e);
                false
            }
        }
    }

    async fn try_save(
        &mut self,
        database: &str,
        collection: &str,
        key: &str,
        body: &str,
        retrieved_at: &str,
    ) -> Result<SaveOutcome, StoreError> {
        let conn = self.connection().await?;

        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM documents WHERE db_name = ? AND collection_name = ? AND doc_key = ?",
        )
        .bind(database)
        .bind(collection)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StoreError::from_sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO documents
                (db_name, collection_name, doc_key, body, retrieved_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (db_name, collection_name, doc_key) DO UPDATE SET
                body = excluded.body,
                retrieved_at = excluded.retrieved_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(database)
        .bind(collection)
        .bind(key)
        .bind(body)
        .bind(retrieved_at)
        .bind(timestamp(Utc::now()))
        .execute(&mut *conn)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(if existing.is_some() {
            SaveOutcome::Replaced
        } else {
            SaveOutcome::Inserted
        })
    }

    /// Point lookup by natural key; misses and failures both give `None`
    pub async fn get<D: Document>(&mut self, key: &str) -> Option<D> {
        let mut attempt = 0;
        let result = loop {
            let result = self.try_get_body(D::DATABASE, D::COLLECTION, Some(key)).await;
            match result {
                Err(e) if self.should_retry(&e, &mut attempt, "get") => continue,
                other => break other,
            }
        };

        match result {
            Ok(Some(body)) => decode::<D>(key, &body),
            Ok(None) => {
                debug!("No {} record with {}={}", D::COLLECTION, D::KEY_FIELD, key);
                None
            }
            Err(e) => {
                error!("Error retrieving {} {}={}: {}", D::COLLECTION, D::KEY_FIELD, key, e);
                None
            }
        }
    }

    /// Most recently retrieved document of a kind
    pub async fn latest<D: Document>(&mut self) -> Option<D> {
        let mut attempt = 0;
        let result = loop {
            let result = self.try_get_body(D::DATABASE, D::COLLECTION, None).await;
            match result {
                Err(e) if self.should_retry(&e, &mut attempt, "latest") => continue,
                other => break other,
            }
        };

        match result {
            Ok(Some(body)) => decode::<D>("latest", &body),
            Ok(None) => None,
            Err(e) => {
                error!("Error retrieving latest {} record: {}", D::COLLECTION, e);
                None
            }
        }
    }

    /// Fetch a body by key, or the newest body when `key` is `None`
    async fn try_get_body(
        &mut self,
        database: &str,
        collection: &str,
        key: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.connection().await?;

        let row: Option<(String,)> = match key {
            Some(key) => {
                sqlx::query_as(
                    r#"
                    SELECT body FROM documents
                    WHERE db_name = ? AND collection_name = ? AND doc_key = ?
                    "#,
                )
                .bind(database)
                .bind(collection)
                .bind(key)
                .fetch_optional(&mut *conn)
                .await
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT body FROM documents
                    WHERE db_name = ? AND collection_name = ?
                    ORDER BY retrieved_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(database)
                .bind(collection)
                .fetch_optional(&mut *conn)
                .await
            }
        }
        .map_err(StoreError::from_sqlx)?;

        Ok(row.map(|(body,)| body))
    }

    /// Last `limit` plays of a stored game (default 30), order preserved
    pub async fn get_latest_slice(
        &mut self,
        game_id: &str,
        limit: Option<usize>,
    ) -> Option<PlayByPlaySnapshot> {
        let snapshot = self.get::<PlayByPlaySnapshot>(game_id).await?;
        Some(snapshot.latest(limit.unwrap_or(DEFAULT_PLAY_LIMIT)))
    }

    /// Number of documents in a kind's collection
    pub async fn count<D: Document>(&mut self) -> Option<i64> {
        let mut attempt = 0;
        let result = loop {
            let result = self.try_count(D::DATABASE, D::COLLECTION).await;
            match result {
                Err(e) if self.should_retry(&e, &mut attempt, "count") => continue,
                other => break other,
            }
        };

        match result {
            Ok(count) => Some(count),
            Err(e) => {
                error!("Error counting {} records: {}", D::COLLECTION, e);
                None
            }
        }
    }

    async fn try_count(&mut self, database: &str, collection: &str) -> Result<i64, StoreError> {
        let conn = self.connection().await?;

        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM documents WHERE db_name = ? AND collection_name = ?",
        )
        .bind(database)
        .bind(collection)
        .fetch_one(&mut *conn)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(row.0)
    }

    /// Return the connection to the pool
    pub fn close(mut self) {
        if self.conn.take().is_some() {
            debug!("Store session released connection");
        }
    }
}

fn decode<D: Document>(key: &str, body: &str) -> Option<D> {
    match serde_json::from_str(body) {
        Ok(doc) => Some(doc),
        Err(source) => {
            error!(
                "{}",
                StoreError::Decode {
                    key: key.to_string(),
                    source,
                }
            );
            None
        }
    }
}
