/*!
 * Common test utilities for the langcache test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use langcache::database::Repository;
use langcache::translation::{BatchScheduler, JsonResponseParser, Oracle, TranslationEngine};


/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, relative_path: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Route library logs to the test harness; set RUST_LOG to see them
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Owned copies of string literals
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// TCP server that accepts connections and never answers
pub async fn spawn_silent_server() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
    let address = listener.local_addr().expect("listener should have an address");
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (address, handle)
}

/// Engine over `cache` that talks to `oracle`
pub fn engine_with(cache: Repository, oracle: Arc<dyn Oracle>, batch_size: usize) -> TranslationEngine {
    init_logging();
    let scheduler = BatchScheduler::new(oracle, Arc::new(JsonResponseParser::new()), batch_size);
    TranslationEngine::new(cache, scheduler)
}

/// Engine over a fresh in-memory cache
pub fn in_memory_engine(oracle: Arc<dyn Oracle>, batch_size: usize) -> TranslationEngine {
    engine_with(
        Repository::new_in_memory().expect("in-memory cache should open"),
        oracle,
        batch_size,
    )
}
