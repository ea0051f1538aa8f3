/*!
 * Cache-first translation engine.
 *
 * Requests are answered from the persistent cache where possible. Only the
 * misses reach the oracle, and every value the oracle produces is written back
 * so the next request for the same string is a hit.
 */

use log::{debug, info};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::app_config::Config;
use crate::database::Repository;
use crate::errors::{CacheError, EngineError};

use super::batch::{BatchScheduler, OracleStatsSnapshot, Resolution};
use super::oracle::OracleClient;
use super::parser::JsonResponseParser;

/// Engine statistics for reporting
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Calls to `resolve` with at least one input
    pub requests: u64,
    /// Distinct strings answered from the cache
    pub cache_hits: u64,
    /// Distinct strings sent to the oracle
    pub cache_misses: u64,
    /// Pairs written back to the cache
    pub learned: u64,
    /// Entries currently stored
    pub stored_entries: i64,
    pub oracle: OracleStatsSnapshot,
}

#[derive(Debug, Default)]
struct EngineCounters {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    learned: AtomicU64,
}

/// Resolves batches of strings through the cache and the oracle
pub struct TranslationEngine {
    cache: Repository,
    scheduler: BatchScheduler,
    counters: EngineCounters,
}

impl TranslationEngine {
    pub fn new(cache: Repository, scheduler: BatchScheduler) -> Self {
        Self {
            cache,
            scheduler,
            counters: EngineCounters::default(),
        }
    }

    /// Open the configured cache and wire up the configured oracle
    pub fn from_config(config: &Config) -> Result<Self, CacheError> {
        let cache = match &config.database.path {
            Some(path) => Repository::open(path)?,
            None => Repository::new_default()?,
        };
        info!("Using translation cache at {}", cache.path().display());

        let scheduler = BatchScheduler::new(
            Arc::new(OracleClient::from_config(config)),
            Arc::new(JsonResponseParser::new()),
            config.oracle.effective_batch_size(),
        );

        Ok(Self::new(cache, scheduler))
    }

    pub fn cache(&self) -> &Repository {
        &self.cache
    }

    /// Translate `inputs`, returning one output per input in the same order
    ///
    /// Duplicates are resolved once. Strings without a translation come back
    /// unchanged. Only cache failures are reported as errors.
    pub async fn resolve(&self, inputs: &[String]) -> Result<Vec<String>, EngineError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mapping = self.resolve_distinct(inputs).await?;
        Ok(inputs
            .iter()
            .map(|text| mapping.get(text).cloned().unwrap_or_else(|| text.clone()))
            .collect())
    }

    /// Translate `inputs`, returning a mapping over the distinct inputs
    pub async fn resolve_map(&self, inputs: &[String]) -> Result<HashMap<String, String>, EngineError> {
        if inputs.is_empty() {
            return Ok(HashMap::new());
        }

        self.resolve_distinct(inputs).await
    }

    async fn resolve_distinct(&self, inputs: &[String]) -> Result<HashMap<String, String>, EngineError> {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);

        let mut seen = HashSet::with_capacity(inputs.len());
        let distinct: Vec<String> = inputs
            .iter()
            .filter(|text| seen.insert(text.as_str()))
            .cloned()
            .collect();

        // The empty string always maps to itself and never touches the cache
        let lookup_keys: Vec<String> = distinct.iter().filter(|t| !t.is_empty()).cloned().collect();
        let mut resolved = self.cache.lookup(&lookup_keys).await?;
        let looked_up = lookup_keys.len();

        let missing: Vec<String> = lookup_keys
            .into_iter()
            .filter(|text| !resolved.contains_key(text))
            .collect();

        let hits = (looked_up - missing.len()) as u64;
        self.counters.cache_hits.fetch_add(hits, Ordering::Relaxed);
        self.counters.cache_misses.fetch_add(missing.len() as u64, Ordering::Relaxed);
        info!("Resolving {} distinct strings: {} cached, {} to translate", distinct.len(), hits, missing.len());

        if !missing.is_empty() {
            let outcomes = self.scheduler.run(&missing).await;
            for source in &missing {
                let outcome = outcomes.get(source).cloned().unwrap_or(Resolution::Identity);
                if let Resolution::Translated(text) = &outcome {
                    self.learn(source, text).await?;
                }
                resolved.insert(source.clone(), outcome.resolve(source));
            }
        }

        for text in distinct {
            resolved.entry(text.clone()).or_insert(text);
        }

        Ok(resolved)
    }

    async fn learn(&self, source: &str, translated: &str) -> Result<(), CacheError> {
        if translated.is_empty() {
            debug!("Learning {:?} as not translatable", source);
        } else if translated == source {
            debug!("Confirmed {:?} needs no translation", source);
        }

        if self.cache.upsert(source, translated).await? {
            self.counters.learned.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Current statistics
    pub async fn stats(&self) -> Result<EngineStats, EngineError> {
        Ok(EngineStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            learned: self.counters.learned.load(Ordering::Relaxed),
            stored_entries: self.cache.count().await?,
            oracle: self.scheduler.stats().snapshot(),
        })
    }
}
