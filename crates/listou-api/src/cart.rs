//! Handler for `GET /cart` — build one virtual cart per active partner store
//! for a whole material list.

use axum::{
  Json,
  extract::{Query, State},
};
use listou_core::{
  cart::{StoreCart, build_store_carts},
  store::SupplyStore,
};
use listou_geo::GeocodeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct CartParams {
  pub list_id:    Option<Uuid>,
  pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
  pub store_carts: Vec<StoreCart>,
  pub total_items: usize,
  pub school_id:   Option<Uuid>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:     Option<String>,
}

/// `GET /cart?list_id=<id>[&session_id=<token>]`
///
/// Cart building is a bulk preview: links are expanded for every
/// (store, item) pair but no per-item click is logged. One list-view event
/// is recorded instead, best-effort.
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<CartParams>,
) -> Result<Json<CartResponse>, ApiError>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let list_id = params
    .list_id
    .ok_or_else(|| ApiError::BadRequest("list_id is required".into()))?;

  let list = state
    .store
    .get_list(list_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("list {list_id} not found")))?;

  if let Err(e) = state
    .store
    .record_list_view(list.list_id, params.session_id)
    .await
  {
    tracing::warn!(%list_id, error = %e, "list view log failed");
  }

  let items = state
    .store
    .list_items(list.list_id)
    .await
    .map_err(ApiError::store)?;
  if items.is_empty() {
    return Ok(Json(CartResponse {
      store_carts: Vec::new(),
      total_items: 0,
      school_id:   list.school_id,
      message:     Some("this list has no items yet".into()),
    }));
  }

  let stores = state
    .store
    .active_partner_stores()
    .await
    .map_err(ApiError::store)?;
  if stores.is_empty() {
    return Ok(Json(CartResponse {
      store_carts: Vec::new(),
      total_items: items.len(),
      school_id:   list.school_id,
      message:     Some("no partner stores are active".into()),
    }));
  }

  Ok(Json(CartResponse {
    store_carts: build_store_carts(&stores, &items),
    total_items: items.len(),
    school_id:   list.school_id,
    message:     None,
  }))
}
