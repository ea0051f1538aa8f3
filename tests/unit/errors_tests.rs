/*!
 * Tests for error types and conversions
 */

use langcache::errors::{CacheError, EngineError, ImportError, ProviderError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection reset".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection reset"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_timeout_shouldMentionSeconds() {
    let display = ProviderError::Timeout(180).to_string();
    assert!(display.contains("180 seconds"));
}

#[test]
fn test_engineError_fromCacheError_shouldWrapMessage() {
    let error: EngineError = CacheError::Query("disk I/O error".to_string()).into();
    let display = error.to_string();
    assert!(display.contains("Translation cache unavailable"));
    assert!(display.contains("disk I/O error"));
}

#[test]
fn test_importError_fromCacheError_shouldWrap() {
    let error: ImportError = CacheError::Query("locked".to_string()).into();
    assert!(matches!(error, ImportError::Cache(_)));
    assert!(error.to_string().contains("locked"));
}
