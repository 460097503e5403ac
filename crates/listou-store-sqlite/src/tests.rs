//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use listou_core::{
  catalog::{CartStrategy, NewPartnerStore},
  cep::CepCoordinate,
  item::{NewItem, NewList, NewSchool},
  store::SupplyStore,
  track::NewClickEvent,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn partner_store(name: &str, order: i64, active: bool) -> NewPartnerStore {
  NewPartnerStore {
    name:            name.to_string(),
    base_url:        "https://shop.example/search".to_string(),
    affiliate_tag:   None,
    search_template: "{{base_url}}?q={{query}}&tag={{affiliate_tag}}"
      .to_string(),
    cart_strategy:   CartStrategy::Search,
    is_active:       active,
    display_order:   order,
  }
}

fn school(name: &str, cep: &str) -> NewSchool {
  NewSchool {
    name:      name.to_string(),
    cep:       cep.to_string(),
    city:      "São Paulo".to_string(),
    state:     "SP".to_string(),
    latitude:  Some(-23.55),
    longitude: Some(-46.63),
  }
}

// ─── Lists and items ─────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_list() {
  let s = store().await;

  let list = s
    .add_list(NewList { school_id: None, title: "1º ano".to_string() })
    .await
    .unwrap();

  let fetched = s.get_list(list.list_id).await.unwrap();
  assert!(fetched.is_some());
  assert_eq!(fetched.unwrap().title, "1º ano");
}

#[tokio::test]
async fn get_list_missing_returns_none() {
  let s = store().await;
  assert!(s.get_list(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_items_preserves_insertion_order() {
  let s = store().await;
  let list = s
    .add_list(NewList { school_id: None, title: "2º ano".to_string() })
    .await
    .unwrap();

  for name in ["Caderno", "Lápis", "Borracha"] {
    s.add_item(NewItem::new(list.list_id, name)).await.unwrap();
  }

  let items = s.list_items(list.list_id).await.unwrap();
  let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
  assert_eq!(names, ["Caderno", "Lápis", "Borracha"]);
}

#[tokio::test]
async fn item_round_trips_optional_fields() {
  let s = store().await;
  let list = s
    .add_list(NewList { school_id: None, title: "3º ano".to_string() })
    .await
    .unwrap();

  let mut input = NewItem::new(list.list_id, "Caderno 10 matérias");
  input.search_query = Some("caderno universitário".to_string());
  input.quantity = 2;
  input.unit = Some("un".to_string());
  input.price_estimate = Some(12.9);
  let item = s.add_item(input).await.unwrap();

  let fetched = s.get_item(item.item_id).await.unwrap().unwrap();
  assert_eq!(fetched.search_query.as_deref(), Some("caderno universitário"));
  assert_eq!(fetched.quantity, 2);
  assert_eq!(fetched.unit.as_deref(), Some("un"));
  assert_eq!(fetched.price_estimate, Some(12.9));
}

// ─── Partner stores ──────────────────────────────────────────────────────────

#[tokio::test]
async fn active_stores_are_filtered_and_ordered() {
  let s = store().await;
  s.add_partner_store(partner_store("C", 2, true)).await.unwrap();
  s.add_partner_store(partner_store("A", 0, true)).await.unwrap();
  s.add_partner_store(partner_store("Inactive", 1, false))
    .await
    .unwrap();
  s.add_partner_store(partner_store("B", 1, true)).await.unwrap();

  let active = s.active_partner_stores().await.unwrap();
  let names: Vec<&str> = active.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["A", "B", "C"]);
}

#[tokio::test]
async fn partner_store_round_trips_strategy_and_tag() {
  let s = store().await;
  let mut input = partner_store("Tagged", 0, true);
  input.affiliate_tag = Some("listou-20".to_string());
  let created = s.add_partner_store(input).await.unwrap();

  let fetched = s
    .get_partner_store(created.store_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.affiliate_tag.as_deref(), Some("listou-20"));
  assert_eq!(fetched.cart_strategy, CartStrategy::Search);
  assert!(fetched.is_active);
}

// ─── Attribution ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_click_assigns_id_and_timestamp() {
  let s = store().await;
  let created = s
    .add_partner_store(partner_store("A", 0, true))
    .await
    .unwrap();

  let mut input = NewClickEvent::new(created.store_id);
  input.session_id = Some("sess-1".to_string());
  let event = s.record_click(input).await.unwrap();

  assert_eq!(event.store_id, created.store_id);
  assert_eq!(event.session_id.as_deref(), Some("sess-1"));
  assert!(event.item_id.is_none());
}

#[tokio::test]
async fn record_list_view_round_trips() {
  let s = store().await;
  let list = s
    .add_list(NewList { school_id: None, title: "4º ano".to_string() })
    .await
    .unwrap();

  let view = s
    .record_list_view(list.list_id, Some("sess-2".to_string()))
    .await
    .unwrap();
  assert_eq!(view.list_id, list.list_id);
}

// ─── CEP coordinate cache ────────────────────────────────────────────────────

fn coordinate(cep: &str, lat: f64) -> CepCoordinate {
  CepCoordinate {
    cep:        cep.to_string(),
    latitude:   lat,
    longitude:  -46.63,
    address:    Some("Avenida Paulista".to_string()),
    city:       Some("São Paulo".to_string()),
    state:      Some("SP".to_string()),
    source:     "test".to_string(),
    updated_at: Utc::now(),
  }
}

#[tokio::test]
async fn cep_cache_miss_then_hit() {
  let s = store().await;
  assert!(s.get_cep_coordinate("01310100").await.unwrap().is_none());

  s.put_cep_coordinate(coordinate("01310100", -23.56))
    .await
    .unwrap();

  let row = s.get_cep_coordinate("01310100").await.unwrap().unwrap();
  assert_eq!(row.latitude, -23.56);
  assert_eq!(row.city.as_deref(), Some("São Paulo"));
}

#[tokio::test]
async fn cep_cache_upsert_is_last_write_wins() {
  let s = store().await;
  s.put_cep_coordinate(coordinate("01310100", -23.56))
    .await
    .unwrap();
  s.put_cep_coordinate(coordinate("01310100", -23.57))
    .await
    .unwrap();

  let row = s.get_cep_coordinate("01310100").await.unwrap().unwrap();
  assert_eq!(row.latitude, -23.57);
}

// ─── Autocomplete ranking ────────────────────────────────────────────────────

#[tokio::test]
async fn suggestions_are_prefix_filtered_and_ranked() {
  let s = store().await;

  // Two schools at 01310-100, one at 01311-000, one outside the prefix.
  s.add_school(school("Escola A", "01310100")).await.unwrap();
  s.add_school(school("Escola B", "01310100")).await.unwrap();
  s.add_school(school("Escola C", "01311000")).await.unwrap();
  s.add_school(school("Escola D", "99999999")).await.unwrap();

  // More searches for the less school-dense CEP; search count ranks first.
  for _ in 0..3 {
    s.record_cep_search("01311000".to_string()).await.unwrap();
  }
  s.record_cep_search("01310100".to_string()).await.unwrap();

  let suggestions = s.cep_suggestions("013", 6).await.unwrap();
  assert_eq!(suggestions.len(), 2);
  assert_eq!(suggestions[0].cep, "01311000");
  assert_eq!(suggestions[0].search_count, 3);
  assert_eq!(suggestions[0].school_count, 1);
  assert_eq!(suggestions[1].cep, "01310100");
  assert_eq!(suggestions[1].school_count, 2);
}

#[tokio::test]
async fn suggestions_respect_the_limit() {
  let s = store().await;
  for i in 0..10 {
    s.add_school(school("Escola", &format!("013101{i:02}")))
      .await
      .unwrap();
  }

  let suggestions = s.cep_suggestions("01310", 5).await.unwrap();
  assert_eq!(suggestions.len(), 5);
}

// ─── Materialised aggregates ─────────────────────────────────────────────────

#[tokio::test]
async fn refresh_popular_schools_groups_clicks() {
  let s = store().await;
  let created = s
    .add_partner_store(partner_store("A", 0, true))
    .await
    .unwrap();
  let school_a = s.add_school(school("Escola A", "01310100")).await.unwrap();
  let school_b = s.add_school(school("Escola B", "01311000")).await.unwrap();

  for school_id in [school_a.school_id, school_a.school_id, school_b.school_id]
  {
    let mut input = NewClickEvent::new(created.store_id);
    input.school_id = Some(school_id);
    s.record_click(input).await.unwrap();
  }
  // A click with no school attribution is excluded from the aggregate.
  s.record_click(NewClickEvent::new(created.store_id))
    .await
    .unwrap();

  let written = s.refresh_popular_schools().await.unwrap();
  assert_eq!(written, 2);

  // Refreshing again replaces, not appends.
  let written = s.refresh_popular_schools().await.unwrap();
  assert_eq!(written, 2);
}

#[tokio::test]
async fn refresh_popular_lists_groups_views() {
  let s = store().await;
  let list_a = s
    .add_list(NewList { school_id: None, title: "A".to_string() })
    .await
    .unwrap();
  let list_b = s
    .add_list(NewList { school_id: None, title: "B".to_string() })
    .await
    .unwrap();

  s.record_list_view(list_a.list_id, None).await.unwrap();
  s.record_list_view(list_a.list_id, None).await.unwrap();
  s.record_list_view(list_b.list_id, None).await.unwrap();

  let written = s.refresh_popular_lists().await.unwrap();
  assert_eq!(written, 2);
}
