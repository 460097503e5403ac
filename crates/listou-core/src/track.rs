//! Attribution events.
//!
//! Click and list-view events are strictly append-only: once written they
//! are never updated or deleted, and concurrent inserts commute. Recording
//! is always best-effort — a failed insert must never fail the operation
//! that triggered it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Click events ────────────────────────────────────────────────────────────

/// A resolved purchase link, as logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
  pub click_id:   Uuid,
  /// Absent for store-level events that are not tied to one item.
  pub item_id:    Option<Uuid>,
  pub store_id:   Uuid,
  pub school_id:  Option<Uuid>,
  pub list_id:    Option<Uuid>,
  /// Caller-supplied opaque analytics token (browser-tab scoped); never
  /// ambient state inside this crate.
  pub session_id: Option<String>,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::SupplyStore::record_click`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewClickEvent {
  pub item_id:    Option<Uuid>,
  pub store_id:   Uuid,
  pub school_id:  Option<Uuid>,
  pub list_id:    Option<Uuid>,
  pub session_id: Option<String>,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
}

impl NewClickEvent {
  /// Convenience constructor with all attribution fields unset.
  pub fn new(store_id: Uuid) -> Self {
    Self {
      item_id: None,
      store_id,
      school_id: None,
      list_id: None,
      session_id: None,
      user_agent: None,
      referrer: None,
    }
  }
}

// ─── List views ──────────────────────────────────────────────────────────────

/// A store-cart page view for a list. Feeds the popular-lists aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListViewEvent {
  pub view_id:    Uuid,
  pub list_id:    Uuid,
  pub session_id: Option<String>,
  pub created_at: DateTime<Utc>,
}
