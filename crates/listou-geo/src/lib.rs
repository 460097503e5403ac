//! Postal-code geocoding for listou.
//!
//! Maps a CEP to coordinates through a persistent cache backed by any
//! [`listou_core::store::SupplyStore`], falling back to an external HTTP
//! geocoder on miss. The external service rate-limits to roughly one request
//! per second, which is why the cache has no TTL: a CEP's geography does not
//! move, and every avoided call matters.

pub mod error;
pub mod provider;
pub mod resolve;

pub use error::{Error, Result};
pub use provider::{GeoFix, GeocodeProvider, HttpGeocoder};
pub use resolve::{ResolvedCep, resolve_cep};
