//! Error types for `listou-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Purchase links must never be handed out for a deactivated store.
  #[error("store {0} is not active")]
  StoreInactive(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
