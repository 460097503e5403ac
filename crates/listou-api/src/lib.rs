//! JSON HTTP API for listou.
//!
//! Exposes an axum [`Router`] backed by any
//! [`listou_core::store::SupplyStore`] and any
//! [`listou_geo::GeocodeProvider`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", listou_api::api_router(state))
//! ```

pub mod cart;
pub mod error;
pub mod geocode;
pub mod refresh;
pub mod resolve;
pub mod schools;
pub mod suggest;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use listou_core::store::SupplyStore;
use listou_geo::GeocodeProvider;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:    Arc<S>,
  pub geocoder: Arc<P>,
}

// Manual impl: cloning the state must not require `S: Clone`/`P: Clone`,
// only the `Arc`s are duplicated.
impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      geocoder: Arc::clone(&self.geocoder),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(state: AppState<S, P>) -> Router<()>
where
  S: SupplyStore + 'static,
  P: GeocodeProvider + 'static,
{
  Router::new()
    // Purchase links
    .route("/resolve", get(resolve::handler::<S, P>))
    .route("/cart", get(cart::handler::<S, P>))
    // CEP search
    .route("/geocode", post(geocode::handler::<S, P>))
    .route("/cep/suggest", get(suggest::handler::<S, P>))
    .route("/schools/search", get(schools::handler::<S, P>))
    // Operations
    .route("/refresh-cache", post(refresh::handler::<S, P>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
