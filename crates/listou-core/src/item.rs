//! Material lists, their line items, and the schools they belong to.
//!
//! These types are owned by the list-management side of the platform; the
//! link-resolution and cart-building code treats them as read-only inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Lists ───────────────────────────────────────────────────────────────────

/// A published school-supply list. Line items live in [`Item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialList {
  pub list_id:    Uuid,
  /// The school this list was published for, when known.
  pub school_id:  Option<Uuid>,
  pub title:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::SupplyStore::add_list`].
#[derive(Debug, Clone)]
pub struct NewList {
  pub school_id: Option<Uuid>,
  pub title:     String,
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// One line of a material list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
  pub item_id:        Uuid,
  pub list_id:        Uuid,
  /// Display name, e.g. "Caderno 10 matérias".
  pub name:           String,
  /// Explicit search override; when present it wins over `name` as the raw
  /// query fed to the purchase-link resolver.
  pub search_query:   Option<String>,
  pub quantity:       u32,
  pub unit:           Option<String>,
  /// Estimated unit price in BRL, when the publisher supplied one.
  pub price_estimate: Option<f64>,
}

impl Item {
  /// The raw (un-normalised) query text for this item: the explicit search
  /// override when present, else the display name.
  pub fn raw_query(&self) -> &str {
    self.search_query.as_deref().unwrap_or(&self.name)
  }
}

/// Input to [`crate::store::SupplyStore::add_item`].
#[derive(Debug, Clone)]
pub struct NewItem {
  pub list_id:        Uuid,
  pub name:           String,
  pub search_query:   Option<String>,
  pub quantity:       u32,
  pub unit:           Option<String>,
  pub price_estimate: Option<f64>,
}

impl NewItem {
  /// Convenience constructor with all optional fields unset and quantity 1.
  pub fn new(list_id: Uuid, name: impl Into<String>) -> Self {
    Self {
      list_id,
      name: name.into(),
      search_query: None,
      quantity: 1,
      unit: None,
      price_estimate: None,
    }
  }
}

// ─── Schools ─────────────────────────────────────────────────────────────────

/// A school that publishes material lists. Coordinates are filled in lazily
/// from the CEP geocoding cache and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
  pub school_id:  Uuid,
  pub name:       String,
  /// Normalised CEP (digits only).
  pub cep:        String,
  pub city:       String,
  pub state:      String,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::SupplyStore::add_school`].
#[derive(Debug, Clone)]
pub struct NewSchool {
  pub name:      String,
  pub cep:       String,
  pub city:      String,
  pub state:     String,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}
