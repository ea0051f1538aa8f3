/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};

/// One row of the `translations` table
///
/// An empty `translated_text` is a real value: the string was resolved and
/// judged not worth translating. It is not the same as the row being absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Source-language text, primary key
    pub source_text: String,
    /// Target-language text
    pub translated_text: String,
}

impl TranslationEntry {
    /// Create a new entry
    pub fn new(source_text: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            translated_text: translated_text.into(),
        }
    }
}
