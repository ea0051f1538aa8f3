/*!
 * # langcache - cache-first translation of short UI strings
 *
 * A Rust library and service that translates batches of short strings
 * (game and mod interface text) by combining a persistent translation
 * cache with a generative translation provider.
 *
 * ## Features
 *
 * - Persistent SQLite cache of `source -> translation` pairs
 * - Cache misses resolved through a generative provider:
 *   - Ollama (local LLM)
 *   - OpenAI-compatible chat completion APIs
 * - Every provider answer is learned, so repeated strings never hit the provider twice
 * - Bounded sub-batches with identity fallback on provider failure
 * - Bulk import of community translation packs
 * - HTTP endpoint and command-line interface
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: Persistent translation cache
 * - `translation`: Cache-first resolution:
 *   - `translation::engine`: Lookup, miss resolution and learning
 *   - `translation::batch`: Sub-batch scheduling
 *   - `translation::oracle`: Provider dispatch
 *   - `translation::parser`: Reply parsing
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI-compatible API client
 * - `importer`: Community pack import
 * - `server`: HTTP surface
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod importer;
pub mod providers;
pub mod server;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::Repository;
pub use errors::{CacheError, EngineError, ImportError, ProviderError};
pub use importer::{ImportOptions, ImportReport, ImportSource, Importer};
pub use translation::{TranslationEngine, EngineStats};
