//! CEP (Brazilian postal code) helpers and the geocode cache row type.
//!
//! CEPs are hierarchical: the first five digits identify a broader area, the
//! full eight digits a street segment. The geocoding fallback in
//! `listou-geo` leans on that structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Digits in a full CEP.
pub const CEP_LEN: usize = 8;

/// Digits in the area-level prefix used as a geocoding fallback.
pub const CEP_PREFIX_LEN: usize = 5;

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Strip a user-entered CEP down to its digits ("01310-100" → "01310100").
pub fn normalize_cep(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// Whether a normalised CEP has all eight digits.
pub fn is_full_cep(normalized: &str) -> bool {
  normalized.len() == CEP_LEN
}

/// The five-digit area prefix of a normalised full CEP.
pub fn cep_prefix(normalized: &str) -> &str {
  &normalized[..CEP_PREFIX_LEN.min(normalized.len())]
}

/// Display form `NNNNN-NNN`. Anything that is not a full CEP is returned
/// unchanged.
pub fn format_cep(normalized: &str) -> String {
  if is_full_cep(normalized) {
    format!("{}-{}", &normalized[..5], &normalized[5..])
  } else {
    normalized.to_string()
  }
}

// ─── Geocode cache row ───────────────────────────────────────────────────────

/// A cached CEP-to-coordinates mapping, keyed by the normalised full CEP.
///
/// Rows are upserted on cache miss and treated as permanently valid —
/// postal-code geography is assumed stable, so there is no TTL.
/// `updated_at` is recorded for forensics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CepCoordinate {
  /// Normalised full CEP — always the code the caller asked for, even when
  /// the coordinates came from a prefix-level fallback lookup.
  pub cep:        String,
  pub latitude:   f64,
  pub longitude:  f64,
  pub address:    Option<String>,
  pub city:       Option<String>,
  pub state:      Option<String>,
  /// Which external provider produced the coordinates.
  pub source:     String,
  pub updated_at: DateTime<Utc>,
}

// ─── Distance ────────────────────────────────────────────────────────────────

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
  let d_lat = (lat2 - lat1).to_radians();
  let d_lon = (lon2 - lon1).to_radians();
  let a = (d_lat / 2.0).sin().powi(2)
    + lat1.to_radians().cos() * lat2.to_radians().cos()
      * (d_lon / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_keeps_only_digits() {
    assert_eq!(normalize_cep("01310-100"), "01310100");
    assert_eq!(normalize_cep(" 01310 100 "), "01310100");
    assert_eq!(normalize_cep("abc"), "");
  }

  #[test]
  fn full_cep_detection() {
    assert!(is_full_cep("01310100"));
    assert!(!is_full_cep("01310"));
    assert!(!is_full_cep("013101000"));
  }

  #[test]
  fn prefix_is_first_five_digits() {
    assert_eq!(cep_prefix("01310100"), "01310");
    assert_eq!(cep_prefix("013"), "013");
  }

  #[test]
  fn format_adds_hyphen_only_for_full_ceps() {
    assert_eq!(format_cep("01310100"), "01310-100");
    assert_eq!(format_cep("01310"), "01310");
  }

  #[test]
  fn haversine_sao_paulo_to_rio() {
    // Praça da Sé to Cristo Redentor, roughly 360 km.
    let d = haversine_km(-23.5505, -46.6333, -22.9519, -43.2105);
    assert!((355.0..365.0).contains(&d), "distance: {d}");
  }

  #[test]
  fn haversine_zero_for_identical_points() {
    assert_eq!(haversine_km(-23.5505, -46.6333, -23.5505, -46.6333), 0.0);
  }
}
