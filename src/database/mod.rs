/*!
 * Database module for the persistent translation cache.
 *
 * This module provides SQLite-based persistence for the
 * `source_text -> translated_text` memory that backs every request.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::TranslationEntry;
pub use repository::Repository;
