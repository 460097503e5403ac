//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The taxonomy maps onto HTTP as: absent entities → 404, inactive stores
//! and bad parameters → 400, unresolvable CEPs → 404, everything transient
//! or unexpected → 500 with a generic body (details go to the log, not the
//! caller).

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A domain rule rejected the request (e.g. resolving against an
  /// inactive store).
  #[error(transparent)]
  Domain(#[from] listou_core::Error),

  #[error("geocode error: {0}")]
  Geocode(#[from] listou_geo::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Domain(e) => (StatusCode::BAD_REQUEST, e.to_string()),
      ApiError::Geocode(e) => match e {
        listou_geo::Error::InvalidCep(_) => {
          (StatusCode::BAD_REQUEST, e.to_string())
        }
        listou_geo::Error::NotFound(_) => {
          (StatusCode::NOT_FOUND, e.to_string())
        }
        other => {
          tracing::error!(error = %other, "geocode service failure");
          (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
      },
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl ApiError {
  /// Wrap a backend error for a 500 response.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}
