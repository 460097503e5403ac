//! Handler for `POST /geocode` — map a CEP to coordinates via the cache and
//! the external geocoder.

use axum::{
  Json,
  extract::State,
};
use listou_core::store::SupplyStore;
use listou_geo::{GeocodeProvider, ResolvedCep, resolve_cep};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct GeocodeBody {
  pub cep: Option<String>,
}

/// `POST /geocode` — body: `{"cep": "01310-100"}`
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Json(body): Json<GeocodeBody>,
) -> Result<Json<ResolvedCep>, ApiError>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let raw = body
    .cep
    .ok_or_else(|| ApiError::BadRequest("cep is required".into()))?;

  let resolved = resolve_cep(&*state.store, &*state.geocoder, &raw).await?;

  // Feed the autocomplete ranking; never blocks the response.
  if let Err(e) = state.store.record_cep_search(resolved.cep.clone()).await {
    tracing::warn!(cep = %resolved.cep, error = %e, "cep search log failed");
  }

  Ok(Json(resolved))
}
