//! Error type for `listou-geo`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input does not normalise to a full 8-digit CEP.
  #[error("cep must contain 8 digits, got {0:?}")]
  InvalidCep(String),

  /// Neither the full code nor its 5-digit prefix resolved externally.
  #[error("no coordinates found for cep {0}")]
  NotFound(String),

  /// The external geocoder failed (network, timeout, non-2xx) and no
  /// coordinates could be obtained at any granularity.
  #[error("geocode provider unavailable for cep {0}")]
  Unavailable(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected status {status} from geocoder")]
  Status { status: u16 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
