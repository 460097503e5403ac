//! The external geocoder seam and its HTTP implementation.

use std::{future::Future, time::Duration};

use serde::Deserialize;

use crate::{Error, Result};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Coordinates (plus whatever locality data the provider knows) for a CEP.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFix {
  pub latitude:  f64,
  pub longitude: f64,
  pub address:   Option<String>,
  pub city:      Option<String>,
  pub state:     Option<String>,
}

/// An external CEP-to-coordinates lookup service.
///
/// `lookup` is called with either a full 8-digit code or a 5-digit area
/// prefix; `Ok(None)` means the provider has no match at that granularity,
/// `Err` means the provider could not be consulted at all.
pub trait GeocodeProvider: Send + Sync {
  /// Short identifier recorded in the cache row's `source` column.
  fn source(&self) -> &str;

  fn lookup<'a>(
    &'a self,
    cep: &'a str,
  ) -> impl Future<Output = Result<Option<GeoFix>>> + Send + 'a;
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// Conservative bound on a single geocoder call; a hung upstream is treated
/// as a lookup failure on expiry.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// Geocoder backed by a BrasilAPI-style JSON endpoint
/// (`GET {base_url}/{cep}`).
///
///// Cheap to clone, the inner [`reqwest::Client`] is `Arc`-based. The
/// upstream rate-limits to about one request per second; callers are
/// expected to hit the cache first and reach here only on miss.
#[derive(Clone)]
pub struct HttpGeocoder {
  client:   reqwest::Client,
  base_url: String,
}

impl HttpGeocoder {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Self::with_timeout(base_url, LOOKUP_TIMEOUT)
  }

  pub fn with_timeout(
    base_url: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, cep: &str) -> String {
    format!("{}/{cep}", self.base_url.trim_end_matches('/'))
  }
}

impl GeocodeProvider for HttpGeocoder {
  fn source(&self) -> &str {
    "http"
  }

  async fn lookup(&self, cep: &str) -> Result<Option<GeoFix>> {
    let resp = self.client.get(self.url(cep)).send().await?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(Error::Status { status: resp.status().as_u16() });
    }

    let wire: WireResponse = resp.json().await?;
    Ok(wire.into_fix())
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

/// A coordinate that some providers serialise as a number and others as a
/// string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coord {
  Num(f64),
  Text(String),
}

impl Coord {
  fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Num(n) => Some(*n),
      Self::Text(s) => s.parse().ok(),
    }
  }
}

#[derive(Debug, Deserialize)]
struct WireCoordinates {
  latitude:  Option<Coord>,
  longitude: Option<Coord>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
  coordinates: Option<WireCoordinates>,
}

/// Accepts both the flat `{latitude, longitude, street, …}` shape and the
/// BrasilAPI-v2 nested `{location: {coordinates: {…}}}` shape.
#[derive(Debug, Deserialize)]
struct WireResponse {
  latitude:  Option<Coord>,
  longitude: Option<Coord>,
  street:    Option<String>,
  address:   Option<String>,
  city:      Option<String>,
  state:     Option<String>,
  location:  Option<WireLocation>,
}

impl WireResponse {
  /// A response with locality data but no usable coordinates counts as "no
  /// match" for geocoding purposes.
  fn into_fix(self) -> Option<GeoFix> {
    let nested = self
      .location
      .as_ref()
      .and_then(|l| l.coordinates.as_ref());

    let latitude = self
      .latitude
      .as_ref()
      .and_then(Coord::as_f64)
      .or_else(|| nested.and_then(|c| c.latitude.as_ref()).and_then(Coord::as_f64))?;
    let longitude = self
      .longitude
      .as_ref()
      .and_then(Coord::as_f64)
      .or_else(|| nested.and_then(|c| c.longitude.as_ref()).and_then(Coord::as_f64))?;

    Some(GeoFix {
      latitude,
      longitude,
      address: self.address.or(self.street),
      city: self.city,
      state: self.state,
    })
  }
}
