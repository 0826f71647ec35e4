//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Returned both for missing resources and for requesters who may not see
/// them, so the two cases are indistinguishable.
pub const NOT_FOUND_REASON: &str = "Either the resource you requested doesn't exist, or you are \
                                    not currently authorized to see it.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found")]
  NotFound,

  #[error("method not allowed: {0}")]
  MethodNotAllowed(String),

  #[error("store error: {source}")]
  Store {
    /// Short type name of the underlying error, logged as `exception`.
    exception: &'static str,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap a storage backend error, remembering its type for the logs.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store { exception: exception_name::<E>(), source: Box::new(e) }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, reason) = match &self {
      ApiError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_REASON.to_owned()),
      ApiError::MethodNotAllowed(m) => (StatusCode::METHOD_NOT_ALLOWED, m.clone()),
      ApiError::Store { exception, source } => {
        tracing::error!(exception = *exception, error = %source, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, source.to_string())
      }
    };
    (status, Json(json!({ "status": "failure", "reason": reason }))).into_response()
  }
}

/// The last path segment of `E`'s type name, e.g. `Error` for
/// `margin_store_sqlite::error::Error`. Generic arguments are dropped.
pub fn exception_name<E: ?Sized>() -> &'static str {
  let full = std::any::type_name::<E>();
  let base = full.split('<').next().unwrap_or(full);
  base.rsplit("::").next().unwrap_or(base)
}
