//! Handler for `GET /schools/search` — schools ordered by distance from a
//! geocoded CEP.

use std::cmp::Ordering;

use axum::{
  Json,
  extract::{Query, State},
};
use listou_core::{cep::haversine_km, item::School, store::SupplyStore};
use listou_geo::{GeocodeProvider, resolve_cep};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

const SEARCH_DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize, Default)]
pub struct SchoolSearchParams {
  pub cep:   Option<String>,
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SchoolHit {
  #[serde(flatten)]
  pub school:      School,
  pub distance_km: f64,
}

/// `GET /schools/search?cep=<code>[&limit=<n>]`
///
/// Schools without known coordinates cannot be ranked and are omitted.
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<SchoolSearchParams>,
) -> Result<Json<Vec<SchoolHit>>, ApiError>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let raw = params
    .cep
    .ok_or_else(|| ApiError::BadRequest("cep is required".into()))?;

  let origin = resolve_cep(&*state.store, &*state.geocoder, &raw).await?;

  let limit = params.limit.unwrap_or(SEARCH_DEFAULT_LIMIT);

  let mut hits: Vec<SchoolHit> = state
    .store
    .list_schools()
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .filter_map(|school| {
      let (lat, lon) = (school.latitude?, school.longitude?);
      let distance_km =
        haversine_km(origin.latitude, origin.longitude, lat, lon);
      Some(SchoolHit { school, distance_km })
    })
    .collect();

  hits.sort_by(|a, b| {
    a.distance_km
      .partial_cmp(&b.distance_km)
      .unwrap_or(Ordering::Equal)
  });
  hits.truncate(limit);

  Ok(Json(hits))
}
