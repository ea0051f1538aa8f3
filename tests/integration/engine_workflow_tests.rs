/*!
 * End-to-end tests for cache-first resolution
 */

use std::sync::Arc;

use langcache::app_config::{Config, ProviderKind};
use langcache::database::Repository;
use langcache::translation::OracleClient;

use crate::common::mock_oracle::{MockOracle, UnreachableOracle};
use crate::common::{self, engine_with, in_memory_engine, strings};

#[tokio::test]
async fn test_resolve_withCachedPair_shouldNeverContactOracle() {
    let cache = Repository::new_in_memory().unwrap();
    cache.upsert("Iron Ingot", "铁锭").await.unwrap();
    let engine = engine_with(cache, Arc::new(UnreachableOracle), 50);

    let result = engine.resolve(&strings(&["Iron Ingot"])).await.unwrap();

    assert_eq!(result, strings(&["铁锭"]));
}

#[tokio::test]
async fn test_resolve_withRepeatedInput_shouldKeepOrderAndDuplicates() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("a", "甲"), ("b", "乙")]));
    let engine = in_memory_engine(oracle, 50);

    let result = engine.resolve(&strings(&["a", "b", "a"])).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result[0], result[2]);
    assert_eq!(result, strings(&["甲", "乙", "甲"]));
}

#[tokio::test]
async fn test_resolve_withDuplicateMisses_shouldSendEachOnce() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("x", "叉"), ("y", "歪")]));
    let engine = in_memory_engine(oracle.clone(), 50);

    engine.resolve(&strings(&["x", "x", "y"])).await.unwrap();

    let sent: Vec<String> = oracle.calls().into_iter().flatten().collect();
    assert_eq!(sent, strings(&["x", "y"]));
}

#[tokio::test]
async fn test_resolve_withBatchSizeTwo_shouldSplitMissesOnly() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[]));
    let cache = Repository::new_in_memory().unwrap();
    cache.upsert("cached", "已缓存").await.unwrap();
    let engine = engine_with(cache, oracle.clone(), 2);

    let result = engine
        .resolve(&strings(&["m1", "cached", "m2", "m3", "m4", "m5"]))
        .await
        .unwrap();

    assert_eq!(result[1], "已缓存");
    assert_eq!(
        oracle.calls(),
        vec![strings(&["m1", "m2"]), strings(&["m3", "m4"]), strings(&["m5"])]
    );
}

#[tokio::test]
async fn test_resolve_withEmptyTranslation_shouldLearnAndReuseIt() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("Foo", "")]));
    let engine = in_memory_engine(oracle.clone(), 50);

    let first = engine.resolve(&strings(&["Foo"])).await.unwrap();
    let second = engine.resolve(&strings(&["Foo"])).await.unwrap();

    assert_eq!(first, strings(&[""]));
    assert_eq!(second, strings(&[""]));
    assert_eq!(oracle.call_count(), 1);

    let stored = engine.cache().lookup(&strings(&["Foo"])).await.unwrap();
    assert_eq!(stored.get("Foo").map(String::as_str), Some(""));
}

#[tokio::test]
async fn test_resolve_withFailingOracle_shouldReturnInputsAndPersistNothing() {
    let oracle = Arc::new(MockOracle::failing());
    let engine = in_memory_engine(oracle.clone(), 50);

    let result = engine.resolve(&strings(&["Gold", "Silver"])).await.unwrap();

    assert_eq!(result, strings(&["Gold", "Silver"]));
    assert_eq!(engine.cache().count().await.unwrap(), 0);

    // Nothing was learned, so the next request asks again
    engine.resolve(&strings(&["Gold"])).await.unwrap();
    assert_eq!(oracle.call_count(), 2);
}

#[tokio::test]
async fn test_resolve_withOneFailingSubBatch_shouldLearnTheOthers() {
    let oracle = Arc::new(
        MockOracle::with_dictionary(&[("a", "甲"), ("b", "乙"), ("c", "丙")]).fail_on_calls(&[1]),
    );
    let engine = in_memory_engine(oracle, 1);

    let result = engine.resolve(&strings(&["a", "b", "c"])).await.unwrap();

    assert_eq!(result, strings(&["甲", "b", "丙"]));
    let stored = engine.cache().lookup(&strings(&["a", "b", "c"])).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(!stored.contains_key("b"));
}

#[tokio::test]
async fn test_resolve_withNoOpTranslation_shouldPersistIt() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("OK", "OK")]));
    let engine = in_memory_engine(oracle.clone(), 50);

    engine.resolve(&strings(&["OK"])).await.unwrap();
    engine.resolve(&strings(&["OK"])).await.unwrap();

    assert_eq!(oracle.call_count(), 1);
    assert_eq!(engine.cache().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_resolve_withKeyMissingFromReply_shouldDefaultWithoutLearning() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("known", "已知")]));
    let engine = in_memory_engine(oracle, 50);

    let result = engine.resolve(&strings(&["known", "unknown"])).await.unwrap();

    assert_eq!(result, strings(&["已知", "unknown"]));
    assert_eq!(engine.cache().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_resolve_acrossEngines_shouldShareLearnedPairsThroughFile() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("translations.db");

    let oracle = Arc::new(MockOracle::with_dictionary(&[("Redstone", "红石")]));
    let first = engine_with(Repository::open(&path).unwrap(), oracle, 50);
    first.resolve(&strings(&["Redstone"])).await.unwrap();
    drop(first);

    let second = engine_with(Repository::open(&path).unwrap(), Arc::new(UnreachableOracle), 50);
    let result = second.resolve(&strings(&["Redstone"])).await.unwrap();

    assert_eq!(result, strings(&["红石"]));
}

#[tokio::test]
async fn test_resolve_concurrently_shouldServeAllRequests() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("a", "甲"), ("b", "乙")]));
    let engine = Arc::new(in_memory_engine(oracle, 50));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.resolve(&strings(&["a", "b"])).await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), strings(&["甲", "乙"]));
    }
    assert_eq!(engine.cache().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_stats_shouldReflectHitsMissesAndFailures() {
    let oracle = Arc::new(MockOracle::with_dictionary(&[("a", "甲")]).fail_on_calls(&[1]));
    let engine = in_memory_engine(oracle, 50);

    engine.resolve(&strings(&["a"])).await.unwrap();
    engine.resolve(&strings(&["a", "z"])).await.unwrap();

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_misses, 2);
    assert_eq!(stats.learned, 1);
    assert_eq!(stats.stored_entries, 1);
    assert_eq!(stats.oracle.oracle_failures, 1);
}

#[tokio::test]
async fn test_resolve_withStuckProvider_shouldTimeOutAndReturnIdentity() {
    let (address, server) = common::spawn_silent_server().await;
    let mut config = Config::default();
    config.oracle.provider = ProviderKind::Ollama;
    config.oracle.ollama.api_url = format!("http://{}/api/generate", address);
    config.oracle.timeout_secs = 1;
    let engine = in_memory_engine(Arc::new(OracleClient::from_config(&config)), 50);

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        engine.resolve(&strings(&["Iron Ingot", "Stone"])),
    )
    .await
    .expect("oracle call should be bounded by its timeout")
    .unwrap();

    assert_eq!(result, strings(&["Iron Ingot", "Stone"]));
    assert_eq!(engine.cache().count().await.unwrap(), 0);
    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.oracle.oracle_failures, 1);
    assert!(stats.oracle.last_error.unwrap().contains("timed out"));
    server.abort();
}
