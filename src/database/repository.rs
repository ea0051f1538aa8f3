/*!
 * Repository layer for the persistent translation cache.
 *
 * This module provides the high-level API the engine and the importer use,
 * abstracting away the SQL details. All calls run on the blocking pool
 * behind the connection mutex.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, params_from_iter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::connection::DatabaseConnection;
use super::models::TranslationEntry;
use crate::errors::CacheError;

/// Maximum number of bound parameters per lookup statement
///
/// SQLite builds before 3.32 cap host parameters at 999.
const LOOKUP_CHUNK_SIZE: usize = 500;

/// Repository for cache operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open (or create) the cache at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let db = DatabaseConnection::new(path).map_err(|e| CacheError::Open(format!("{:#}", e)))?;
        Ok(Self::new(db))
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self, CacheError> {
        let db = DatabaseConnection::new_default().map_err(|e| CacheError::Open(format!("{:#}", e)))?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, CacheError> {
        let db = DatabaseConnection::new_in_memory().map_err(|e| CacheError::Open(format!("{:#}", e)))?;
        Ok(Self::new(db))
    }

    /// Path of the backing store
    pub fn path(&self) -> PathBuf {
        self.db.path().to_path_buf()
    }

    /// Look up every key in `keys`
    ///
    /// Only keys present in the store appear in the returned map.
    pub async fn lookup(&self, keys: &[String]) -> Result<HashMap<String, String>, CacheError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let keys = keys.to_vec();

        self.db
            .execute_async(move |conn| {
                let mut found = HashMap::with_capacity(keys.len());

                for chunk in keys.chunks(LOOKUP_CHUNK_SIZE) {
                    let placeholders = vec!["?"; chunk.len()].join(", ");
                    let sql = format!(
                        "SELECT source_text, translated_text FROM translations WHERE source_text IN ({})",
                        placeholders
                    );

                    let mut stmt = conn.prepare_cached(&sql)?;
                    let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?;

                    for row in rows {
                        let (source, translated) = row?;
                        found.insert(source, translated);
                    }
                }

                debug!("Cache lookup: {} of {} keys present", found.len(), keys.len());
                Ok(found)
            })
            .await
            .map_err(query_error)
    }

    /// Insert or replace one translation
    ///
    /// Returns `false` without touching the store when `key` is empty.
    /// The write is committed before this returns.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<bool, CacheError> {
        if key.is_empty() {
            return Ok(false);
        }

        let key = key.to_string();
        let value = value.to_string();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO translations (source_text, translated_text) VALUES (?1, ?2)",
                    params![key, value],
                )?;
                Ok(true)
            })
            .await
            .map_err(query_error)
    }

    /// Insert or replace many translations in one transaction
    ///
    /// Entries with an empty source text are skipped. Returns the number of rows written.
    pub async fn upsert_many(&self, entries: Vec<TranslationEntry>) -> Result<usize, CacheError> {
        if entries.is_empty() {
            return Ok(0);
        }

        self.db
            .transaction_async(move |tx| {
                let mut written = 0;
                let mut stmt = tx.prepare_cached(
                    "INSERT OR REPLACE INTO translations (source_text, translated_text) VALUES (?1, ?2)",
                )?;

                for entry in entries.iter().filter(|e| !e.source_text.is_empty()) {
                    stmt.execute(params![entry.source_text, entry.translated_text])?;
                    written += 1;
                }

                Ok(written)
            })
            .await
            .map_err(query_error)
    }

    /// Number of stored translations
    pub async fn count(&self) -> Result<i64, CacheError> {
        self.db
            .execute_async(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .map_err(query_error)
    }

    /// Delete every stored translation, returning how many rows were removed
    pub async fn clear(&self) -> Result<i64, CacheError> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM translations", [])?;
                Ok(deleted as i64)
            })
            .await
            .map_err(query_error)
    }
}

fn query_error(error: anyhow::Error) -> CacheError {
    CacheError::Query(format!("{:#}", error))
}
