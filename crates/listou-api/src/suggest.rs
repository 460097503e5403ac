//! Handler for `GET /cep/suggest` — ranked CEP autocomplete suggestions.
//!
//! The debounce window and keyboard semantics live client-side
//! ([`listou_core::suggest`]); the server mirrors the minimum-prefix rule so
//! a misbehaving client cannot force table scans on a one-digit prefix.

use axum::{
  Json,
  extract::{Query, State},
};
use listou_core::{
  cep::normalize_cep,
  store::SupplyStore,
  suggest::{CepSuggestion, SUGGEST_DEFAULT_LIMIT, SUGGEST_MIN_PREFIX_LEN},
};
use listou_geo::GeocodeProvider;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Hard cap regardless of what the caller asks for.
const SUGGEST_MAX_LIMIT: usize = 20;

#[derive(Debug, Deserialize, Default)]
pub struct SuggestParams {
  pub q:     Option<String>,
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
  pub cep:          String,
  /// `NNNNN-NNN` form for direct display.
  pub display_cep:  String,
  pub city:         String,
  pub state:        String,
  pub school_count: u64,
  pub search_count: u64,
}

impl From<CepSuggestion> for SuggestionResponse {
  fn from(s: CepSuggestion) -> Self {
    Self {
      display_cep: s.display_cep(),
      cep: s.cep,
      city: s.city,
      state: s.state,
      school_count: s.school_count,
      search_count: s.search_count,
    }
  }
}

/// `GET /cep/suggest?q=<prefix>[&limit=<n>]`
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<SuggestionResponse>>, ApiError>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let prefix = normalize_cep(params.q.as_deref().unwrap_or_default());
  if prefix.len() < SUGGEST_MIN_PREFIX_LEN {
    return Ok(Json(Vec::new()));
  }

  let limit = params
    .limit
    .unwrap_or(SUGGEST_DEFAULT_LIMIT)
    .min(SUGGEST_MAX_LIMIT);

  let suggestions = state
    .store
    .cep_suggestions(&prefix, limit)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(
    suggestions.into_iter().map(SuggestionResponse::from).collect(),
  ))
}
