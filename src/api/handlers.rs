//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{current_timestamp, CacheEntry, CacheStore, FuzzFactor, MemoryBackend};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HasResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Store type served over HTTP.
pub type SharedStore = CacheStore<Arc<MemoryBackend>>;

/// Application state shared across all handlers.
///
/// The store synchronizes inside its backend, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    /// Prefixing store over the in-memory backend
    pub cache: Arc<SharedStore>,
    /// Lifetime applied when a request omits one
    pub default_lifetime: u64,
    /// Fuzz factor applied when a request omits one
    pub fuzz_factor: FuzzFactor,
}

impl AppState {
    /// Creates a new AppState around a store, with default entry settings.
    pub fn new(store: SharedStore) -> Self {
        Self {
            cache: Arc::new(store),
            default_lifetime: crate::cache::DEFAULT_LIFETIME_SECONDS,
            fuzz_factor: FuzzFactor::default(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// # Errors
    /// Fails if the configured fuzz factor is out of range.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = Arc::new(MemoryBackend::new(config.max_entries));
        let store = CacheStore::with_prefix(backend, config.prefix.clone());

        Ok(Self {
            cache: Arc::new(store),
            default_lifetime: config.default_lifetime,
            fuzz_factor: FuzzFactor::new(config.fuzz_factor)?,
        })
    }

    /// The backend shared with background tasks.
    pub fn backend(&self) -> &Arc<MemoryBackend> {
        self.cache.backend()
    }
}

/// Handler for PUT /set
///
/// Saves the payload under the key with the requested freshness settings.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let fuzz_factor = match req.fuzz {
        Some(factor) => FuzzFactor::new(factor)?,
        None => state.fuzz_factor,
    };

    let mut entry = CacheEntry::with_value(req.key, req.payload)
        .with_lifetime_seconds(req.lifetime.unwrap_or(state.default_lifetime))
        .with_best_before_seconds(req.best_before)
        .with_fuzz_factor(fuzz_factor);

    state.cache.save(&mut entry)?;
    debug!(key = entry.key(), "entry saved");

    Ok(Json(SetResponse::new(entry.key(), entry.stored_at())))
}

/// Handler for GET /get/:key
///
/// Returns the payload and its freshness; 404 when the entry is absent.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let entry = state.cache.get::<Value>(&key)?;

    GetResponse::from_entry(entry, current_timestamp())
        .map(Json)
        .ok_or(CacheError::NotFound(key))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HasResponse>> {
    let exists = state.cache.has_key(&key)?;
    Ok(Json(HasResponse::new(key, exists)))
}

/// Handler for DELETE /del/:key
///
/// Deleting a missing key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key)?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.backend().stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Backend, EntryState};
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(CacheStore::new(Arc::new(MemoryBackend::new(100))))
    }

    fn set_request(key: &str, payload: Value) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            payload,
            lifetime: None,
            best_before: None,
            fuzz: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let result = set_handler(State(state.clone()), Json(set_request("test_key", json!("v")))).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.payload, json!("v"));
        assert_eq!(response.state, EntryState::Fresh);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(test_state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_reports_stale_entry() {
        let state = test_state();
        let mut entry = CacheEntry::with_value("old", json!(1))
            .with_lifetime_seconds(600)
            .with_best_before_seconds(30);
        state
            .cache
            .save_with(&mut entry, current_timestamp() - 240, &mut rand::thread_rng())
            .unwrap();

        let response = get_handler(State(state), Path("old".to_string())).await.unwrap();
        assert!(response.stale);
        assert_eq!(response.best_before, Some(30));
    }

    #[tokio::test]
    async fn test_has_and_delete_handler() {
        let state = test_state();
        let saved = set_handler(State(state.clone()), Json(set_request("to_delete", json!([]))))
            .await
            .unwrap();
        assert!(saved.stored_at.is_some());

        let has = has_handler(State(state.clone()), Path("to_delete".to_string())).await.unwrap();
        assert!(has.exists);

        let deleted = delete_handler(State(state.clone()), Path("to_delete".to_string()))
            .await
            .unwrap();
        assert_eq!(deleted.key, "to_delete");

        let has = has_handler(State(state.clone()), Path("to_delete".to_string())).await.unwrap();
        assert!(!has.exists);
        assert!(get_handler(State(state), Path("to_delete".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_set_uses_configured_prefix() {
        let config = Config {
            prefix: "svc_".to_string(),
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();

        let _ = set_handler(State(state.clone()), Json(set_request("k", json!(1))))
            .await
            .unwrap();

        assert!(state.backend().contains("svc_k").unwrap());
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_fuzz() {
        let config = Config {
            fuzz_factor: 3.0,
            ..Config::default()
        };
        assert!(matches!(
            AppState::from_config(&config),
            Err(CacheError::InvalidFuzzFactor(_))
        ));
    }

    #[tokio::test]
    async fn test_set_invalid_fuzz() {
        let mut req = set_request("key", json!("value"));
        req.fuzz = Some(-0.5);

        let result = set_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidFuzzFactor(_))));
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let result = set_handler(State(test_state()), Json(set_request("", json!("value")))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
