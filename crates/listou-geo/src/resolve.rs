//! Cache-then-external CEP resolution.
//!
//! ```text
//! normalize → cache lookup ─ hit ─→ return (cached = true)
//!                │ miss
//!                ├─ external lookup (full 8 digits) ─ found ─→ persist + return
//!                │ miss
//!                ├─ external lookup (5-digit prefix) ─ found ─→ persist under
//!                │ miss                                  the ORIGINAL code + return
//!                └─→ NotFound (or Unavailable if a lookup stage errored)
//! ```
//!
//! The prefix fallback trades precision for availability: the 5-digit area
//! centroid is close enough for distance-ordering schools. Caching the
//! fallback result under the original full code means the prefix is never
//! re-queried for that code.

use chrono::Utc;
use listou_core::{
  cep::{CepCoordinate, cep_prefix, is_full_cep, normalize_cep},
  store::SupplyStore,
};
use serde::Serialize;

use crate::{
  Error, Result,
  provider::{GeoFix, GeocodeProvider},
};

/// The outcome of a CEP resolution, cache-aware.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCep {
  /// Normalised full CEP the caller asked for.
  pub cep:       String,
  pub latitude:  f64,
  pub longitude: f64,
  pub address:   Option<String>,
  pub city:      Option<String>,
  pub state:     Option<String>,
  /// Whether this came straight from the cache (no external call).
  pub cached:    bool,
  pub source:    String,
}

impl ResolvedCep {
  fn from_row(row: CepCoordinate, cached: bool) -> Self {
    Self {
      cep: row.cep,
      latitude: row.latitude,
      longitude: row.longitude,
      address: row.address,
      city: row.city,
      state: row.state,
      cached,
      source: row.source,
    }
  }
}

/// Resolve a raw user-entered CEP to coordinates.
///
/// Concurrent first-time lookups of the same code may each call the external
/// provider and each upsert the cache row; the writes carry identical data,
/// so last-write-wins is harmless and no locking is used.
pub async fn resolve_cep<S, P>(
  store: &S,
  provider: &P,
  raw: &str,
) -> Result<ResolvedCep>
where
  S: SupplyStore,
  P: GeocodeProvider,
{
  let cep = normalize_cep(raw);
  if !is_full_cep(&cep) {
    return Err(Error::InvalidCep(raw.to_string()));
  }

  // Cache reads are best-effort: a failing cache degrades to a miss.
  match store.get_cep_coordinate(&cep).await {
    Ok(Some(row)) => return Ok(ResolvedCep::from_row(row, true)),
    Ok(None) => {}
    Err(e) => {
      tracing::warn!(%cep, error = %e, "cep cache read failed, treating as miss");
    }
  }

  let mut stage_failed = false;

  // Exact match on the full code.
  match provider.lookup(&cep).await {
    Ok(Some(fix)) => {
      return Ok(persist(store, provider.source(), &cep, fix).await);
    }
    Ok(None) => {}
    Err(e) => {
      stage_failed = true;
      tracing::warn!(%cep, error = %e, "full-code geocode lookup failed");
    }
  }

  // Area-level fallback on the 5-digit prefix.
  let prefix = cep_prefix(&cep);
  match provider.lookup(prefix).await {
    Ok(Some(fix)) => {
      return Ok(persist(store, provider.source(), &cep, fix).await);
    }
    Ok(None) => {}
    Err(e) => {
      stage_failed = true;
      tracing::warn!(%cep, prefix, error = %e, "prefix geocode lookup failed");
    }
  }

  if stage_failed {
    Err(Error::Unavailable(cep))
  } else {
    Err(Error::NotFound(cep))
  }
}

/// Upsert the cache row (best-effort) and build the response.
/// The row is always keyed by the original full code, even for a
/// prefix-level fix.
async fn persist<S: SupplyStore>(
  store: &S,
  source: &str,
  cep: &str,
  fix: GeoFix,
) -> ResolvedCep {
  let row = CepCoordinate {
    cep:        cep.to_string(),
    latitude:   fix.latitude,
    longitude:  fix.longitude,
    address:    fix.address,
    city:       fix.city,
    state:      fix.state,
    source:     source.to_string(),
    updated_at: Utc::now(),
  };

  if let Err(e) = store.put_cep_coordinate(row.clone()).await {
    tracing::warn!(%cep, error = %e, "cep cache write failed");
  }

  ResolvedCep::from_row(row, false)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, sync::Mutex};

  use listou_store_sqlite::SqliteStore;

  use super::*;

  /// Scripted provider that records every code it is asked about.
  struct MockProvider {
    fixes: HashMap<String, GeoFix>,
    fail:  bool,
    calls: Mutex<Vec<String>>,
  }

  impl MockProvider {
    fn new(fixes: &[(&str, f64, f64)]) -> Self {
      Self {
        fixes: fixes
          .iter()
          .map(|(cep, lat, lon)| {
            (
              cep.to_string(),
              GeoFix {
                latitude:  *lat,
                longitude: *lon,
                address:   None,
                city:      Some("São Paulo".to_string()),
                state:     Some("SP".to_string()),
              },
            )
          })
          .collect(),
        fail:  false,
        calls: Mutex::new(Vec::new()),
      }
    }

    fn failing() -> Self {
      Self { fixes: HashMap::new(), fail: true, calls: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> Vec<String> {
      self.calls.lock().unwrap().clone()
    }
  }

  impl GeocodeProvider for MockProvider {
    fn source(&self) -> &str {
      "mock"
    }

    async fn lookup(&self, cep: &str) -> Result<Option<GeoFix>> {
      self.calls.lock().unwrap().push(cep.to_string());
      if self.fail {
        return Err(Error::Status { status: 503 });
      }
      Ok(self.fixes.get(cep).cloned())
    }
  }

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.unwrap()
  }

  #[tokio::test]
  async fn first_lookup_calls_provider_second_hits_cache() {
    let store = store().await;
    let provider = MockProvider::new(&[("01310100", -23.56, -46.65)]);

    let first = resolve_cep(&store, &provider, "01310-100").await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.latitude, -23.56);
    assert_eq!(provider.calls(), ["01310100"]);

    let second = resolve_cep(&store, &provider, "01310-100").await.unwrap();
    assert!(second.cached);
    assert_eq!(second.latitude, -23.56);
    // No further external calls.
    assert_eq!(provider.calls(), ["01310100"]);
  }

  #[tokio::test]
  async fn prefix_fallback_caches_under_the_original_code() {
    let store = store().await;
    // Only the area prefix resolves.
    let provider = MockProvider::new(&[("01310", -23.55, -46.64)]);

    let resolved = resolve_cep(&store, &provider, "01310-999").await.unwrap();
    assert!(!resolved.cached);
    assert_eq!(resolved.cep, "01310999");
    assert_eq!(resolved.latitude, -23.55);
    assert_eq!(provider.calls(), ["01310999", "01310"]);

    // Cached under the full code; the prefix is never re-queried.
    let again = resolve_cep(&store, &provider, "01310999").await.unwrap();
    assert!(again.cached);
    assert_eq!(again.cep, "01310999");
    assert_eq!(provider.calls(), ["01310999", "01310"]);
  }

  #[tokio::test]
  async fn double_miss_is_not_found() {
    let store = store().await;
    let provider = MockProvider::new(&[]);

    let err = resolve_cep(&store, &provider, "99999999").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(cep) if cep == "99999999"));
    assert_eq!(provider.calls(), ["99999999", "99999"]);
  }

  #[tokio::test]
  async fn provider_failure_surfaces_as_unavailable() {
    let store = store().await;
    let provider = MockProvider::failing();

    let err = resolve_cep(&store, &provider, "01310100").await.unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)));
  }

  #[tokio::test]
  async fn short_input_is_rejected_before_any_lookup() {
    let store = store().await;
    let provider = MockProvider::new(&[]);

    let err = resolve_cep(&store, &provider, "0131").await.unwrap_err();
    assert!(matches!(err, Error::InvalidCep(_)));
    assert!(provider.calls().is_empty());
  }
}
