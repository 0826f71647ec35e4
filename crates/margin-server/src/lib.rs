//! HTTP server assembly for Margin.
//!
//! Wires the [`margin_api`] router under `/api`, adds request tracing, and
//! provides the pieces `main` needs: configuration, the exception log filter,
//! the event logging task, and bearer token generation.

pub mod log_filter;

use std::path::PathBuf;

use axum::Router;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use margin_api::AppState;
use margin_core::{event::AnnotationEvent, store::AnnotationStore};
use rand_core::{OsRng, RngCore as _};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::trace::TraceLayer;

pub use log_filter::ExceptionFilter;

/// Prefix of every issued bearer token.
pub const TOKEN_PREFIX: &str = "6879-";

// ─── Configuration ────────────────────────────────────────────────────────────

/// One `(exception, level)` pair for [`ExceptionFilter`].
#[derive(Deserialize, Clone, Debug)]
pub struct LogFilterConfig {
  pub exception: String,
  pub level:     String,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `MARGIN_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  /// Public URL the service is reachable at; used to build links.
  pub base_url:    String,
  pub store_path:  PathBuf,
  #[serde(default)]
  pub log_filters: Vec<LogFilterConfig>,
}

impl ServerConfig {
  /// Build the exception filter, failing on unknown level names.
  pub fn exception_filter(&self) -> Result<ExceptionFilter, log_filter::InvalidLevel> {
    ExceptionFilter::new(self.log_filters.iter().map(|f| (f.exception.clone(), f.level.as_str())))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", margin_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// Log every published annotation event until the channel closes.
pub async fn log_events(mut events: broadcast::Receiver<AnnotationEvent>) {
  loop {
    match events.recv().await {
      Ok(event) => {
        tracing::info!(annotation = %event.annotation_id, action = %event.action, "annotation event");
      }
      Err(RecvError::Lagged(skipped)) => {
        tracing::warn!(skipped, "annotation event log fell behind");
      }
      Err(RecvError::Closed) => break,
    }
  }
}

// ─── Tokens ───────────────────────────────────────────────────────────────────

/// A fresh random bearer token. Only its hash is ever stored.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  format!("{TOKEN_PREFIX}{}", B64.encode(bytes))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use margin_core::links::LinkBuilder;
  use margin_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn config(log_filters: Vec<LogFilterConfig>) -> ServerConfig {
    ServerConfig {
      host: "127.0.0.1".to_string(),
      port: 5000,
      base_url: "http://localhost:5000".to_string(),
      store_path: PathBuf::from(":memory:"),
      log_filters,
    }
  }

  #[test]
  fn tokens_are_prefixed_and_unique() {
    let a = generate_token();
    let b = generate_token();
    assert!(a.starts_with(TOKEN_PREFIX));
    assert_eq!(a.len(), TOKEN_PREFIX.len() + 43);
    assert_ne!(a, b);
  }

  #[test]
  fn config_rejects_unknown_levels() {
    let bad = config(vec![LogFilterConfig { exception: "ReadTimeout".into(), level: "WARNI".into() }]);
    assert!(bad.exception_filter().is_err());

    let good = config(vec![LogFilterConfig { exception: "ReadTimeout".into(), level: "WARNING".into() }]);
    let filter = good.exception_filter().unwrap();
    assert!(filter.suppresses(Some("ReadTimeout"), tracing::Level::WARN));
  }

  #[tokio::test]
  async fn api_is_mounted_under_api_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = AppState::new(Arc::new(store), LinkBuilder::new("http://localhost:5000"));

    let req = Request::builder().uri("/api/groups/__world__").body(Body::empty()).unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/groups/__world__").body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn log_events_stops_when_channel_closes() {
    let (tx, rx) = broadcast::channel(4);
    let task = tokio::spawn(log_events(rx));
    tx.send(AnnotationEvent::update(uuid::Uuid::new_v4())).unwrap();
    drop(tx);
    task.await.unwrap();
  }
}
