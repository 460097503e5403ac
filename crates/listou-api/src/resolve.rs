//! Handler for `GET /resolve` — resolve one (item, store) pair to a purchase
//! URL and log the click.

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, header},
};
use listou_core::{
  link::{ResolvedLink, resolve_link},
  store::SupplyStore,
  track::NewClickEvent,
};
use listou_geo::GeocodeProvider;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ResolveParams {
  pub item_id:    Option<Uuid>,
  pub store_id:   Option<Uuid>,
  pub school_id:  Option<Uuid>,
  pub list_id:    Option<Uuid>,
  /// Opaque caller-supplied analytics token.
  pub session_id: Option<String>,
}

/// `GET /resolve?item_id=<id>&store_id=<id>[&school_id][&list_id][&session_id]`
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<ResolveParams>,
  headers: HeaderMap,
) -> Result<Json<ResolvedLink>, ApiError>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let item_id = params
    .item_id
    .ok_or_else(|| ApiError::BadRequest("item_id is required".into()))?;
  let store_id = params
    .store_id
    .ok_or_else(|| ApiError::BadRequest("store_id is required".into()))?;

  let item = state
    .store
    .get_item(item_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("item {item_id} not found")))?;

  let store = state
    .store
    .get_partner_store(store_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("store {store_id} not found")))?;

  let link = resolve_link(&item, &store)?;

  // Click logging is best-effort: analytics must never break resolution.
  let click = NewClickEvent {
    item_id:    Some(item.item_id),
    store_id:   store.store_id,
    school_id:  params.school_id,
    list_id:    params.list_id.or(Some(item.list_id)),
    session_id: params.session_id,
    user_agent: header_str(&headers, header::USER_AGENT),
    referrer:   header_str(&headers, header::REFERER),
  };
  if let Err(e) = state.store.record_click(click).await {
    tracing::warn!(%item_id, %store_id, error = %e, "click log failed");
  }

  Ok(Json(link))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string)
}
