//! The `SupplyStore` trait — the storage seam of the platform.
//!
//! The trait is implemented by storage backends (e.g.
//! `listou-store-sqlite`). Higher layers (`listou-api`, `listou-geo`) depend
//! on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  catalog::{NewPartnerStore, PartnerStore},
  cep::CepCoordinate,
  item::{Item, MaterialList, NewItem, NewList, NewSchool, School},
  suggest::CepSuggestion,
  track::{ClickEvent, ListViewEvent, NewClickEvent},
};

/// Abstraction over a listou storage backend.
///
/// Lists, items, stores and schools are plain CRUD rows. Click, view and
/// CEP-search events are append-only. The CEP coordinate cache is a
/// last-write-wins upsert keyed by the normalised postal code.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SupplyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Catalog writes (publishing / administration) ──────────────────────

  fn add_school(
    &self,
    input: NewSchool,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  fn add_list(
    &self,
    input: NewList,
  ) -> impl Future<Output = Result<MaterialList, Self::Error>> + Send + '_;

  fn add_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  fn add_partner_store(
    &self,
    input: NewPartnerStore,
  ) -> impl Future<Output = Result<PartnerStore, Self::Error>> + Send + '_;

  // ── Catalog reads ─────────────────────────────────────────────────────

  /// Retrieve an item by id. Returns `None` if not found.
  fn get_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  fn get_list(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<MaterialList>, Self::Error>> + Send + '_;

  /// All items of a list, in the list's natural (insertion) order.
  fn list_items(
    &self,
    list_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  fn get_partner_store(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PartnerStore>, Self::Error>> + Send + '_;

  /// Active partner stores ordered by `display_order` ascending.
  fn active_partner_stores(
    &self,
  ) -> impl Future<Output = Result<Vec<PartnerStore>, Self::Error>> + Send + '_;

  fn get_school(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + '_;

  fn list_schools(
    &self,
  ) -> impl Future<Output = Result<Vec<School>, Self::Error>> + Send + '_;

  // ── Attribution — append-only writes ──────────────────────────────────

  /// Record a click event and return the persisted row.
  /// `created_at` is set by the store.
  fn record_click(
    &self,
    input: NewClickEvent,
  ) -> impl Future<Output = Result<ClickEvent, Self::Error>> + Send + '_;

  /// Record one store-cart view for a list.
  fn record_list_view(
    &self,
    list_id: Uuid,
    session_id: Option<String>,
  ) -> impl Future<Output = Result<ListViewEvent, Self::Error>> + Send + '_;

  /// Record a CEP search (feeds the autocomplete ranking).
  fn record_cep_search(
    &self,
    cep: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── CEP coordinate cache ──────────────────────────────────────────────

  /// Cache lookup by normalised full CEP.
  fn get_cep_coordinate<'a>(
    &'a self,
    cep: &'a str,
  ) -> impl Future<Output = Result<Option<CepCoordinate>, Self::Error>> + Send + 'a;

  /// Upsert a cache row (last-write-wins on the CEP key).
  fn put_cep_coordinate(
    &self,
    row: CepCoordinate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Autocomplete ──────────────────────────────────────────────────────

  /// Ranked CEP suggestions for a digits-only prefix, most searched first.
  fn cep_suggestions<'a>(
    &'a self,
    prefix: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CepSuggestion>, Self::Error>> + Send + 'a;

  // ── Materialised aggregates ───────────────────────────────────────────

  /// Recompute the popular-schools aggregate from click events.
  /// Returns the number of rows written.
  fn refresh_popular_schools(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Recompute the popular-lists aggregate from list-view events.
  /// Returns the number of rows written.
  fn refresh_popular_lists(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
