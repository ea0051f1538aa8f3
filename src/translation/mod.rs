/*!
 * Cache-first string translation.
 *
 * This module contains the translation path from request to oracle and back.
 * It is split into several submodules:
 *
 * - `engine`: Cache lookup, miss resolution and learning
 * - `batch`: Sub-batch scheduling and fallback handling
 * - `oracle`: Provider dispatch for one sub-batch
 * - `parser`: Extraction of the translation object from raw replies
 * - `prompts`: Prompt templates and builders for translation
 */

// Re-export main types for easier usage
pub use self::batch::{BatchScheduler, OracleStats, OracleStatsSnapshot, Resolution};
pub use self::engine::{EngineStats, TranslationEngine};
pub use self::oracle::{Oracle, OracleClient, OracleReply};
pub use self::parser::{JsonResponseParser, ResponseParser};

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod batch;
pub mod engine;
pub mod oracle;
pub mod parser;
pub mod prompts;
