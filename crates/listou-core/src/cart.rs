//! Store carts — per-retailer previews of a whole material list.
//!
//! A cart is never stored; it is computed on read from the list's items and
//! the active partner stores, the same way a materialised contact view is
//! derived from facts. Cart building reuses the exact link logic from
//! [`crate::link`] but records no click events (it is a preview, not a
//! click).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  catalog::{CartStrategy, PartnerStore},
  item::Item,
  link::build_link,
};

// ─── Cart types ──────────────────────────────────────────────────────────────

/// One line of a store cart: an item with its resolved purchase URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
  pub item_id:        Uuid,
  pub item_name:      String,
  pub url:            String,
  pub quantity:       u32,
  pub unit:           Option<String>,
  pub price_estimate: Option<f64>,
}

/// A virtual cart for one partner store. Derived, never persisted.
///
/// Invariants, for a list with `n` items:
/// - `items.len() == n` — every item appears, priced or not;
/// - `items_with_price + items_without_price == n`;
/// - `total_estimate` is `None` iff `items_with_price == 0`, so an unpriced
///   list never shows a misleading "R$ 0,00" total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCart {
  pub store_id:            Uuid,
  pub store_name:          String,
  pub cart_strategy:       CartStrategy,
  pub items:               Vec<CartItem>,
  /// Sum of `price_estimate * quantity` over priced items.
  pub total_estimate:      Option<f64>,
  pub items_with_price:    usize,
  pub items_without_price: usize,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Build one cart per store for the given items.
///
/// Stores are expected in display order and items in the list's natural
/// fetch order; both orders are preserved, nothing is re-sorted. Either
/// slice being empty yields an empty cart collection.
pub fn build_store_carts(
  stores: &[PartnerStore],
  items: &[Item],
) -> Vec<StoreCart> {
  if stores.is_empty() || items.is_empty() {
    return Vec::new();
  }

  stores
    .iter()
    .map(|store| {
      let cart_items: Vec<CartItem> = items
        .iter()
        .map(|item| {
          let link = build_link(item, store);
          CartItem {
            item_id:        item.item_id,
            item_name:      item.name.clone(),
            url:            link.url,
            quantity:       item.quantity,
            unit:           item.unit.clone(),
            price_estimate: item.price_estimate,
          }
        })
        .collect();

      let mut items_with_price = 0usize;
      let mut total = 0.0f64;
      for item in items {
        if let Some(price) = item.price_estimate {
          items_with_price += 1;
          total += price * f64::from(item.quantity);
        }
      }

      StoreCart {
        store_id:            store.store_id,
        store_name:          store.name.clone(),
        cart_strategy:       store.cart_strategy,
        total_estimate:      (items_with_price > 0).then_some(total),
        items_with_price,
        items_without_price: items.len() - items_with_price,
        items:               cart_items,
      }
    })
    .collect()
}

// ─── Open plan ───────────────────────────────────────────────────────────────

/// Delay between successive window opens when opening a whole cart.
/// Browsers flag a burst of `window.open` calls as popups; a short stagger
/// keeps them below the blocker heuristics.
pub const OPEN_STAGGER_MS: u64 = 300;

/// One scheduled open in a cart's open plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOpen {
  pub url:      String,
  /// Delay from plan start, not from the previous open.
  pub delay_ms: u64,
}

/// The sequenced open schedule for a cart under its strategy.
///
/// [`CartStrategy::Search`] opens every item as its own search page,
/// staggered by [`OPEN_STAGGER_MS`]. This is deliberately a sequential
/// schedule, never a concurrent burst.
pub fn open_plan(cart: &StoreCart) -> Vec<PlannedOpen> {
  match cart.cart_strategy {
    CartStrategy::Search => cart
      .items
      .iter()
      .enumerate()
      .map(|(i, item)| PlannedOpen {
        url:      item.url.clone(),
        delay_ms: i as u64 * OPEN_STAGGER_MS,
      })
      .collect(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn store(name: &str, order: i64) -> PartnerStore {
    PartnerStore {
      store_id:        Uuid::new_v4(),
      name:            name.to_string(),
      base_url:        "https://shop.example/search".to_string(),
      affiliate_tag:   None,
      search_template: "{{base_url}}?q={{query}}&tag={{affiliate_tag}}"
        .to_string(),
      cart_strategy:   CartStrategy::Search,
      is_active:       true,
      display_order:   order,
      created_at:      Utc::now(),
    }
  }

  fn item(name: &str, quantity: u32, price: Option<f64>) -> Item {
    Item {
      item_id:        Uuid::new_v4(),
      list_id:        Uuid::new_v4(),
      name:           name.to_string(),
      search_query:   None,
      quantity,
      unit:           None,
      price_estimate: price,
    }
  }

  #[test]
  fn empty_inputs_yield_no_carts() {
    assert!(build_store_carts(&[], &[item("Caderno", 1, None)]).is_empty());
    assert!(build_store_carts(&[store("A", 0)], &[]).is_empty());
  }

  #[test]
  fn every_item_appears_in_every_cart() {
    let stores = [store("A", 0), store("B", 1), store("C", 2)];
    let items = [
      item("Caderno", 1, Some(12.5)),
      item("Lápis", 2, None),
      item("Borracha", 1, Some(3.0)),
    ];

    let carts = build_store_carts(&stores, &items);
    assert_eq!(carts.len(), 3);
    for cart in &carts {
      assert_eq!(cart.items.len(), items.len());
      assert_eq!(
        cart.items_with_price + cart.items_without_price,
        items.len()
      );
    }
  }

  #[test]
  fn orderings_are_preserved() {
    let stores = [store("B", 1), store("A", 0)];
    let items = [item("Segundo", 1, None), item("Primeiro", 1, None)];

    // The builder trusts the caller's order; it must not re-sort.
    let carts = build_store_carts(&stores, &items);
    assert_eq!(carts[0].store_name, "B");
    assert_eq!(carts[1].store_name, "A");
    assert_eq!(carts[0].items[0].item_name, "Segundo");
    assert_eq!(carts[0].items[1].item_name, "Primeiro");
  }

  #[test]
  fn totals_sum_price_times_quantity_over_priced_items() {
    let stores = [store("A", 0)];
    let items = [
      item("Caderno", 2, Some(10.0)),
      item("Mochila", 1, None),
    ];

    let carts = build_store_carts(&stores, &items);
    let cart = &carts[0];
    assert_eq!(cart.total_estimate, Some(20.0));
    assert_eq!(cart.items_with_price, 1);
    assert_eq!(cart.items_without_price, 1);
  }

  #[test]
  fn fully_unpriced_list_has_null_total() {
    let stores = [store("A", 0)];
    let items = [item("Caderno", 3, None), item("Lápis", 1, None)];

    let cart = &build_store_carts(&stores, &items)[0];
    assert_eq!(cart.total_estimate, None);
    assert_eq!(cart.items_with_price, 0);
    assert_eq!(cart.items_without_price, 2);
  }

  #[test]
  fn cart_urls_match_single_link_resolution() {
    // The cart builder and the link resolver must never diverge.
    let stores = [store("A", 0)];
    let items = [item("Lápis de Cor nº 2!", 1, None)];

    let cart = &build_store_carts(&stores, &items)[0];
    let direct = crate::link::build_link(&items[0], &stores[0]);
    assert_eq!(cart.items[0].url, direct.url);
  }

  #[test]
  fn open_plan_staggers_by_300ms() {
    let stores = [store("A", 0)];
    let items = [
      item("Caderno", 1, None),
      item("Lápis", 1, None),
      item("Borracha", 1, None),
    ];

    let plan = open_plan(&build_store_carts(&stores, &items)[0]);
    assert_eq!(plan.len(), 3);
    assert_eq!(plan[0].delay_ms, 0);
    assert_eq!(plan[1].delay_ms, 300);
    assert_eq!(plan[2].delay_ms, 600);
  }
}
