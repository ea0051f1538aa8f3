/*!
 * Tests for seeding the cache from a community pack and translating with it
 */

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use langcache::database::Repository;
use langcache::{ImportOptions, ImportSource, Importer};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::common::mock_oracle::{MockOracle, UnreachableOracle};
use crate::common::{self, engine_with, strings};

fn build_pack(path: &std::path::Path, files: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[tokio::test]
async fn test_import_thenResolve_shouldServeImportedPairsFromCache() {
    let dir = common::create_temp_dir().unwrap();
    let pack = dir.path().join("pack.zip");
    build_pack(
        &pack,
        &[
            ("assets/minecraft/lang/en_us.json", r#"{"block.stone": "Stone", "item.apple": "Apple"}"#),
            ("assets/minecraft/lang/zh_cn.json", r#"{"block.stone": "石头", "item.apple": "苹果"}"#),
        ],
    );
    let cache = Repository::open(dir.path().join("translations.db")).unwrap();

    let report = Importer::new(cache.clone(), ImportOptions::default())
        .run(&ImportSource::Archive(pack))
        .await
        .unwrap();
    assert_eq!(report.written, 2);

    let engine = engine_with(cache, Arc::new(UnreachableOracle), 50);
    let result = engine.resolve(&strings(&["Apple", "Stone", "Apple"])).await.unwrap();

    assert_eq!(result, strings(&["苹果", "石头", "苹果"]));
}

#[tokio::test]
async fn test_import_withPartialCoverage_shouldOnlyAskOracleForGaps() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "assets/create/lang/en_us.json", r#"{"a": "Wrench", "b": "Gearbox"}"#).unwrap();
    common::create_test_file(dir.path(), "assets/create/lang/zh_cn.json", r#"{"a": "扳手", "b": ""}"#).unwrap();
    let cache = Repository::new_in_memory().unwrap();

    Importer::new(cache.clone(), ImportOptions::default())
        .run(&ImportSource::Directory(dir.path().to_path_buf()))
        .await
        .unwrap();

    let oracle = Arc::new(MockOracle::with_dictionary(&[("Gearbox", "齿轮箱")]));
    let engine = engine_with(cache, oracle.clone(), 50);
    let result = engine.resolve(&strings(&["Wrench", "Gearbox"])).await.unwrap();

    assert_eq!(result, strings(&["扳手", "齿轮箱"]));
    assert_eq!(oracle.calls(), vec![strings(&["Gearbox"])]);
}

#[tokio::test]
async fn test_import_withCustomLocales_shouldPairThoseFiles() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "assets/mod/lang/en_us.json", r#"{"k": "Stone"}"#).unwrap();
    common::create_test_file(dir.path(), "assets/mod/lang/ja_jp.json", r#"{"k": "石"}"#).unwrap();
    common::create_test_file(dir.path(), "assets/mod/lang/zh_cn.json", r#"{"k": "石头"}"#).unwrap();
    let cache = Repository::new_in_memory().unwrap();

    let options = ImportOptions {
        target_locale: "ja_jp".to_string(),
        ..Default::default()
    };
    Importer::new(cache.clone(), options)
        .run(&ImportSource::Directory(dir.path().to_path_buf()))
        .await
        .unwrap();

    let found = cache.lookup(&strings(&["Stone"])).await.unwrap();
    assert_eq!(found["Stone"], "石");
}

#[tokio::test]
async fn test_import_withProgress_shouldReportEveryFile() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "assets/a/lang/en_us.json", r#"{"k": "A"}"#).unwrap();
    common::create_test_file(dir.path(), "assets/a/lang/zh_cn.json", r#"{"k": "甲"}"#).unwrap();
    common::create_test_file(dir.path(), "assets/a/textures/readme.txt", "ignored").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let last_total = Arc::new(AtomicUsize::new(0));
    let (calls_in, total_in) = (Arc::clone(&calls), Arc::clone(&last_total));

    Importer::new(Repository::new_in_memory().unwrap(), ImportOptions::default())
        .run_with_progress(&ImportSource::Directory(dir.path().to_path_buf()), move |_, total| {
            calls_in.fetch_add(1, Ordering::SeqCst);
            total_in.store(total, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(last_total.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_import_withMissingDirectory_shouldFail() {
    let result = Importer::new(Repository::new_in_memory().unwrap(), ImportOptions::default())
        .run(&ImportSource::Directory("/nonexistent/pack".into()))
        .await;

    assert!(result.is_err());
}
