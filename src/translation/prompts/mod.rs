/*!
 * Prompt construction for oracle calls.
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptTemplate, TranslationPromptBuilder};
