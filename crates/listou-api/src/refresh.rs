//! Handler for `POST /refresh-cache` — rebuild the popular-schools and
//! popular-lists materialised aggregates.
//!
//! A failed sub-refresh is reported inside `results` rather than failing the
//! whole request; 500 is reserved for errors outside the per-target work.

use std::time::Instant;

use axum::{
  Json,
  extract::State,
};
use chrono::{DateTime, Utc};
use listou_core::store::SupplyStore;
use listou_geo::GeocodeProvider;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct RefreshBody {
  /// Refresh the popular-schools aggregate; defaults to true.
  pub schools: Option<bool>,
  /// Refresh the popular-lists aggregate; defaults to true.
  pub lists:   Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
  pub success:     bool,
  pub duration_ms: u64,
  pub results:     serde_json::Value,
  pub timestamp:   DateTime<Utc>,
}

/// `POST /refresh-cache` — body: `{"schools": true, "lists": true}` (both
/// optional, both default true).
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  body: Option<Json<RefreshBody>>,
) -> Result<Json<RefreshResponse>, ApiError>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let started = Instant::now();

  let mut results = serde_json::Map::new();
  let mut success = true;

  if body.schools.unwrap_or(true) {
    match state.store.refresh_popular_schools().await {
      Ok(written) => {
        results.insert("schools".into(), json!({ "refreshed": written }));
      }
      Err(e) => {
        success = false;
        tracing::warn!(error = %e, "popular-schools refresh failed");
        results.insert("schools".into(), json!({ "error": e.to_string() }));
      }
    }
  }

  if body.lists.unwrap_or(true) {
    match state.store.refresh_popular_lists().await {
      Ok(written) => {
        results.insert("lists".into(), json!({ "refreshed": written }));
      }
      Err(e) => {
        success = false;
        tracing::warn!(error = %e, "popular-lists refresh failed");
        results.insert("lists".into(), json!({ "error": e.to_string() }));
      }
    }
  }

  Ok(Json(RefreshResponse {
    success,
    duration_ms: started.elapsed().as_millis() as u64,
    results: serde_json::Value::Object(results),
    timestamp: Utc::now(),
  }))
}
