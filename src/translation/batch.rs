/*!
 * Batch processing of cache misses.
 *
 * Misses are split into consecutive sub-batches that go to the oracle one
 * after another. A sub-batch that fails or returns unreadable output falls
 * back to the identity mapping for its members; the remaining sub-batches
 * still run.
 */

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::oracle::{Oracle, OracleReply};
use super::parser::ResponseParser;

/// Outcome for one miss string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The oracle produced a value for the key; it may be empty or equal to the source
    Translated(String),
    /// No value was obtained; the string resolves to itself
    Identity,
}

impl Resolution {
    /// Final text for `source`
    pub fn resolve(&self, source: &str) -> String {
        match self {
            Resolution::Translated(text) => text.clone(),
            Resolution::Identity => source.to_string(),
        }
    }
}

/// Running counters for oracle traffic
#[derive(Debug, Default)]
pub struct OracleStats {
    sub_batches: AtomicU64,
    oracle_failures: AtomicU64,
    unparseable_replies: AtomicU64,
    strings_translated: AtomicU64,
    strings_defaulted: AtomicU64,
    last_error: RwLock<Option<String>>,
}

/// Point-in-time copy of [`OracleStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OracleStatsSnapshot {
    pub sub_batches: u64,
    pub oracle_failures: u64,
    pub unparseable_replies: u64,
    pub strings_translated: u64,
    pub strings_defaulted: u64,
    pub last_error: Option<String>,
}

impl OracleStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_failure(&self, message: String) {
        self.oracle_failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(message);
    }

    fn record_unparseable(&self) {
        self.unparseable_replies.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some("Oracle reply did not contain a JSON object".to_string());
    }

    pub fn snapshot(&self) -> OracleStatsSnapshot {
        OracleStatsSnapshot {
            sub_batches: self.sub_batches.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
            unparseable_replies: self.unparseable_replies.load(Ordering::Relaxed),
            strings_translated: self.strings_translated.load(Ordering::Relaxed),
            strings_defaulted: self.strings_defaulted.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }
}

/// Splits misses into sub-batches and resolves each through the oracle
#[derive(Clone)]
pub struct BatchScheduler {
    oracle: Arc<dyn Oracle>,
    parser: Arc<dyn ResponseParser>,
    batch_size: usize,
    stats: Arc<OracleStats>,
}

impl BatchScheduler {
    /// Create a scheduler; a zero `batch_size` is treated as 1
    pub fn new(oracle: Arc<dyn Oracle>, parser: Arc<dyn ResponseParser>, batch_size: usize) -> Self {
        Self {
            oracle,
            parser,
            batch_size: batch_size.max(1),
            stats: Arc::new(OracleStats::new()),
        }
    }

    /// Shared counters
    pub fn stats(&self) -> Arc<OracleStats> {
        Arc::clone(&self.stats)
    }

    /// Resolve every string in `misses`
    ///
    /// `misses` is expected to hold distinct strings. Every one of them is a
    /// key of the returned map.
    pub async fn run(&self, misses: &[String]) -> HashMap<String, Resolution> {
        let mut resolved = HashMap::with_capacity(misses.len());
        if misses.is_empty() {
            return resolved;
        }

        let total_batches = misses.len().div_ceil(self.batch_size);
        for (index, chunk) in misses.chunks(self.batch_size).enumerate() {
            info!("Processing batch {}/{} ({} strings)", index + 1, total_batches, chunk.len());
            self.stats.sub_batches.fetch_add(1, Ordering::Relaxed);

            let outcome = self.run_sub_batch(chunk).await;
            resolved.extend(chunk.iter().cloned().zip(outcome));
        }

        resolved
    }

    /// Resolutions for one chunk, in chunk order
    async fn run_sub_batch(&self, chunk: &[String]) -> Vec<Resolution> {
        let raw = match self.oracle.complete(chunk).await {
            Ok(OracleReply::Raw(raw)) => raw,
            Ok(OracleReply::Identity) => {
                debug!("Oracle returned identity for {} strings", chunk.len());
                return self.defaulted(chunk.len());
            }
            Err(e) => {
                error!("Oracle request failed, keeping {} strings untranslated: {}", chunk.len(), e);
                self.stats.record_failure(e.to_string());
                return self.defaulted(chunk.len());
            }
        };

        let Some(mut mapping) = self.parser.parse(&raw) else {
            let preview: String = raw.chars().take(200).collect();
            warn!("Could not parse oracle reply, keeping {} strings untranslated. Reply starts with: {}", chunk.len(), preview);
            self.stats.record_unparseable();
            return self.defaulted(chunk.len());
        };

        let mut translated = 0u64;
        let resolutions: Vec<Resolution> = chunk
            .iter()
            .map(|source| match mapping.remove(source) {
                Some(text) => {
                    translated += 1;
                    Resolution::Translated(text)
                }
                None => {
                    debug!("Oracle reply is missing key: {:?}", source);
                    Resolution::Identity
                }
            })
            .collect();

        if !mapping.is_empty() {
            debug!("Ignoring {} unexpected keys in oracle reply", mapping.len());
        }

        self.stats.strings_translated.fetch_add(translated, Ordering::Relaxed);
        self.stats
            .strings_defaulted
            .fetch_add(chunk.len() as u64 - translated, Ordering::Relaxed);

        resolutions
    }

    fn defaulted(&self, count: usize) -> Vec<Resolution> {
        self.stats.strings_defaulted.fetch_add(count as u64, Ordering::Relaxed);
        vec![Resolution::Identity; count]
    }
}
