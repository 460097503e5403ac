//! [`SqliteStore`] — the SQLite implementation of [`SupplyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use listou_core::{
  catalog::{NewPartnerStore, PartnerStore},
  cep::CepCoordinate,
  item::{Item, MaterialList, NewItem, NewList, NewSchool, School},
  store::SupplyStore,
  suggest::CepSuggestion,
  track::{ClickEvent, ListViewEvent, NewClickEvent},
};

use crate::{
  Error, Result,
  encode::{
    RawCepCoordinate, RawItem, RawList, RawPartnerStore, RawSchool,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A listou supply store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SupplyStore impl ────────────────────────────────────────────────────────

impl SupplyStore for SqliteStore {
  type Error = Error;

  // ── Catalog writes ────────────────────────────────────────────────────────

  async fn add_school(&self, input: NewSchool) -> Result<School> {
    let school = School {
      school_id:  Uuid::new_v4(),
      name:       input.name,
      cep:        input.cep,
      city:       input.city,
      state:      input.state,
      latitude:   input.latitude,
      longitude:  input.longitude,
      created_at: Utc::now(),
    };

    let row = school.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO schools (
             school_id, name, cep, city, state, latitude, longitude, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            encode_uuid(row.school_id),
            row.name,
            row.cep,
            row.city,
            row.state,
            row.latitude,
            row.longitude,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(school)
  }

  async fn add_list(&self, input: NewList) -> Result<MaterialList> {
    let list = MaterialList {
      list_id:    Uuid::new_v4(),
      school_id:  input.school_id,
      title:      input.title,
      created_at: Utc::now(),
    };

    let row = list.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lists (list_id, school_id, title, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(row.list_id),
            row.school_id.map(encode_uuid),
            row.title,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(list)
  }

  async fn add_item(&self, input: NewItem) -> Result<Item> {
    let item = Item {
      item_id:        Uuid::new_v4(),
      list_id:        input.list_id,
      name:           input.name,
      search_query:   input.search_query,
      quantity:       input.quantity,
      unit:           input.unit,
      price_estimate: input.price_estimate,
    };

    let row = item.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (
             item_id, list_id, name, search_query, quantity, unit, price_estimate
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(row.item_id),
            encode_uuid(row.list_id),
            row.name,
            row.search_query,
            i64::from(row.quantity),
            row.unit,
            row.price_estimate,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn add_partner_store(
    &self,
    input: NewPartnerStore,
  ) -> Result<PartnerStore> {
    let store = PartnerStore {
      store_id:        Uuid::new_v4(),
      name:            input.name,
      base_url:        input.base_url,
      affiliate_tag:   input.affiliate_tag,
      search_template: input.search_template,
      cart_strategy:   input.cart_strategy,
      is_active:       input.is_active,
      display_order:   input.display_order,
      created_at:      Utc::now(),
    };

    let row = store.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO partner_stores (
             store_id, name, base_url, affiliate_tag, search_template,
             cart_strategy, is_active, display_order, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            encode_uuid(row.store_id),
            row.name,
            row.base_url,
            row.affiliate_tag,
            row.search_template,
            row.cart_strategy.tag(),
            row.is_active,
            row.display_order,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(store)
  }

  // ── Catalog reads ─────────────────────────────────────────────────────────

  async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT item_id, list_id, name, search_query, quantity, unit,
                    price_estimate
             FROM items WHERE item_id = ?1",
            rusqlite::params![id_str],
            RawItem::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawItem::decode).transpose()
  }

  async fn get_list(&self, id: Uuid) -> Result<Option<MaterialList>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawList> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT list_id, school_id, title, created_at
             FROM lists WHERE list_id = ?1",
            rusqlite::params![id_str],
            RawList::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawList::decode).transpose()
  }

  async fn list_items(&self, list_id: Uuid) -> Result<Vec<Item>> {
    let id_str = encode_uuid(list_id);
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT item_id, list_id, name, search_query, quantity, unit,
                  price_estimate
           FROM items WHERE list_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::decode).collect()
  }

  async fn get_partner_store(&self, id: Uuid) -> Result<Option<PartnerStore>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPartnerStore> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT store_id, name, base_url, affiliate_tag, search_template,
                    cart_strategy, is_active, display_order, created_at
             FROM partner_stores WHERE store_id = ?1",
            rusqlite::params![id_str],
            RawPartnerStore::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawPartnerStore::decode).transpose()
  }

  async fn active_partner_stores(&self) -> Result<Vec<PartnerStore>> {
    let raws: Vec<RawPartnerStore> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT store_id, name, base_url, affiliate_tag, search_template,
                  cart_strategy, is_active, display_order, created_at
           FROM partner_stores
           WHERE is_active = 1
           ORDER BY display_order ASC, rowid ASC",
        )?;
        let rows = stmt
          .query_map([], RawPartnerStore::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPartnerStore::decode).collect()
  }

  async fn get_school(&self, id: Uuid) -> Result<Option<School>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawSchool> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT school_id, name, cep, city, state, latitude, longitude,
                    created_at
             FROM schools WHERE school_id = ?1",
            rusqlite::params![id_str],
            RawSchool::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawSchool::decode).transpose()
  }

  async fn list_schools(&self) -> Result<Vec<School>> {
    let raws: Vec<RawSchool> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT school_id, name, cep, city, state, latitude, longitude,
                  created_at
           FROM schools ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map([], RawSchool::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSchool::decode).collect()
  }

  // ── Attribution ───────────────────────────────────────────────────────────

  async fn record_click(&self, input: NewClickEvent) -> Result<ClickEvent> {
    let event = ClickEvent {
      click_id:   Uuid::new_v4(),
      item_id:    input.item_id,
      store_id:   input.store_id,
      school_id:  input.school_id,
      list_id:    input.list_id,
      session_id: input.session_id,
      user_agent: input.user_agent,
      referrer:   input.referrer,
      created_at: Utc::now(),
    };

    let row = event.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO click_events (
             click_id, item_id, store_id, school_id, list_id,
             session_id, user_agent, referrer, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            encode_uuid(row.click_id),
            row.item_id.map(encode_uuid),
            encode_uuid(row.store_id),
            row.school_id.map(encode_uuid),
            row.list_id.map(encode_uuid),
            row.session_id,
            row.user_agent,
            row.referrer,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn record_list_view(
    &self,
    list_id: Uuid,
    session_id: Option<String>,
  ) -> Result<ListViewEvent> {
    let event = ListViewEvent {
      view_id: Uuid::new_v4(),
      list_id,
      session_id,
      created_at: Utc::now(),
    };

    let row = event.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO list_view_events (view_id, list_id, session_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(row.view_id),
            encode_uuid(row.list_id),
            row.session_id,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn record_cep_search(&self, cep: String) -> Result<()> {
    let at = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cep_search_events (cep, created_at) VALUES (?1, ?2)",
          rusqlite::params![cep, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── CEP coordinate cache ──────────────────────────────────────────────────

  async fn get_cep_coordinate(&self, cep: &str) -> Result<Option<CepCoordinate>> {
    let cep = cep.to_owned();
    let raw: Option<RawCepCoordinate> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT cep, latitude, longitude, address, city, state, source,
                    updated_at
             FROM cep_coordinates WHERE cep = ?1",
            rusqlite::params![cep],
            RawCepCoordinate::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawCepCoordinate::decode).transpose()
  }

  async fn put_cep_coordinate(&self, row: CepCoordinate) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cep_coordinates (
             cep, latitude, longitude, address, city, state, source, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(cep) DO UPDATE SET
             latitude   = excluded.latitude,
             longitude  = excluded.longitude,
             address    = excluded.address,
             city       = excluded.city,
             state      = excluded.state,
             source     = excluded.source,
             updated_at = excluded.updated_at",
          rusqlite::params![
            row.cep,
            row.latitude,
            row.longitude,
            row.address,
            row.city,
            row.state,
            row.source,
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Autocomplete ──────────────────────────────────────────────────────────

  async fn cep_suggestions(
    &self,
    prefix: &str,
    limit: usize,
  ) -> Result<Vec<CepSuggestion>> {
    let prefix = prefix.to_owned();
    let limit = limit as i64;

    let rows: Vec<(String, String, String, i64, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.cep,
                  MIN(s.city),
                  MIN(s.state),
                  COUNT(*) AS school_count,
                  COALESCE((SELECT COUNT(*) FROM cep_search_events e
                            WHERE e.cep = s.cep), 0) AS search_count
           FROM schools s
           WHERE s.cep LIKE ?1 || '%'
           GROUP BY s.cep
           ORDER BY search_count DESC, school_count DESC, s.cep ASC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![prefix, limit], |row| {
            Ok((
              row.get(0)?,
              row.get(1)?,
              row.get(2)?,
              row.get(3)?,
              row.get(4)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(cep, city, state, school_count, search_count)| CepSuggestion {
          cep,
          city,
          state,
          school_count: school_count.max(0) as u64,
          search_count: search_count.max(0) as u64,
        })
        .collect(),
    )
  }

  // ── Materialised aggregates ───────────────────────────────────────────────

  async fn refresh_popular_schools(&self) -> Result<u64> {
    let at = encode_dt(Utc::now());
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM popular_schools", [])?;
        let written = tx.execute(
          "INSERT INTO popular_schools (school_id, click_count, refreshed_at)
           SELECT school_id, COUNT(*), ?1
           FROM click_events
           WHERE school_id IS NOT NULL
           GROUP BY school_id",
          rusqlite::params![at],
        )?;
        tx.commit()?;
        Ok(written as u64)
      })
      .await?;
    Ok(written)
  }

  async fn refresh_popular_lists(&self) -> Result<u64> {
    let at = encode_dt(Utc::now());
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM popular_lists", [])?;
        let written = tx.execute(
          "INSERT INTO popular_lists (list_id, view_count, refreshed_at)
           SELECT list_id, COUNT(*), ?1
           FROM list_view_events
           GROUP BY list_id",
          rusqlite::params![at],
        )?;
        tx.commit()?;
        Ok(written as u64)
      })
      .await?;
    Ok(written)
  }
}
