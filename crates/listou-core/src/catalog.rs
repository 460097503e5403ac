//! Partner stores — the retailers purchase links point at.
//!
//! Stores are configured by platform administration and read-only here. Each
//! carries a URL template with `{{base_url}}`, `{{query}}` and
//! `{{affiliate_tag}}` placeholders, expanded by [`crate::link`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Cart strategy ───────────────────────────────────────────────────────────

/// How a "buy everything at this store" action behaves.
///
/// Only one strategy exists today; unknown tags stored by older admin tooling
/// decode to [`CartStrategy::Search`] so a bad row never breaks cart building.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CartStrategy {
  /// Open each item as its own search page at the store.
  #[default]
  Search,
}

impl CartStrategy {
  /// The tag string stored in the `cart_strategy` column.
  pub fn tag(self) -> &'static str {
    match self {
      Self::Search => "search",
    }
  }

  /// Decode a stored tag; unknown values fall back to [`Self::Search`].
  pub fn from_tag(tag: &str) -> Self {
    match tag {
      "search" => Self::Search,
      _ => Self::Search,
    }
  }
}

// ─── Partner store ───────────────────────────────────────────────────────────

/// A partner retailer with a configured purchase-link template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerStore {
  pub store_id:        Uuid,
  pub name:            String,
  pub base_url:        String,
  /// Affiliate id injected into `{{affiliate_tag}}`; absent for stores with
  /// no affiliate programme.
  pub affiliate_tag:   Option<String>,
  /// URL template, e.g. `{{base_url}}?q={{query}}&tag={{affiliate_tag}}`.
  pub search_template: String,
  pub cart_strategy:   CartStrategy,
  pub is_active:       bool,
  /// Ascending sort key for store carts and store pickers.
  pub display_order:   i64,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::SupplyStore::add_partner_store`].
#[derive(Debug, Clone)]
pub struct NewPartnerStore {
  pub name:            String,
  pub base_url:        String,
  pub affiliate_tag:   Option<String>,
  pub search_template: String,
  pub cart_strategy:   CartStrategy,
  pub is_active:       bool,
  pub display_order:   i64,
}
