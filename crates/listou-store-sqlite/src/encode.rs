//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Cart strategies are stored as their tag
//! string, with unknown tags decoding to the default strategy.

use chrono::{DateTime, Utc};
use listou_core::{
  catalog::{CartStrategy, PartnerStore},
  cep::CepCoordinate,
  item::{Item, MaterialList, School},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────
//
// Columns come off the rusqlite row as plain strings/numbers inside the
// connection closure; decoding into domain types happens outside it, where
// our own error type is available.

pub struct RawList {
  pub list_id:    String,
  pub school_id:  Option<String>,
  pub title:      String,
  pub created_at: String,
}

impl RawList {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      list_id:    row.get(0)?,
      school_id:  row.get(1)?,
      title:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn decode(self) -> Result<MaterialList> {
    Ok(MaterialList {
      list_id:    decode_uuid(&self.list_id)?,
      school_id:  decode_opt_uuid(self.school_id.as_deref())?,
      title:      self.title,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawItem {
  pub item_id:        String,
  pub list_id:        String,
  pub name:           String,
  pub search_query:   Option<String>,
  pub quantity:       i64,
  pub unit:           Option<String>,
  pub price_estimate: Option<f64>,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:        row.get(0)?,
      list_id:        row.get(1)?,
      name:           row.get(2)?,
      search_query:   row.get(3)?,
      quantity:       row.get(4)?,
      unit:           row.get(5)?,
      price_estimate: row.get(6)?,
    })
  }

  pub fn decode(self) -> Result<Item> {
    Ok(Item {
      item_id:        decode_uuid(&self.item_id)?,
      list_id:        decode_uuid(&self.list_id)?,
      name:           self.name,
      search_query:   self.search_query,
      quantity:       u32::try_from(self.quantity)
        .map_err(|_| Error::Decode(format!("bad quantity: {}", self.quantity)))?,
      unit:           self.unit,
      price_estimate: self.price_estimate,
    })
  }
}

pub struct RawPartnerStore {
  pub store_id:        String,
  pub name:            String,
  pub base_url:        String,
  pub affiliate_tag:   Option<String>,
  pub search_template: String,
  pub cart_strategy:   String,
  pub is_active:       bool,
  pub display_order:   i64,
  pub created_at:      String,
}

impl RawPartnerStore {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      store_id:        row.get(0)?,
      name:            row.get(1)?,
      base_url:        row.get(2)?,
      affiliate_tag:   row.get(3)?,
      search_template: row.get(4)?,
      cart_strategy:   row.get(5)?,
      is_active:       row.get(6)?,
      display_order:   row.get(7)?,
      created_at:      row.get(8)?,
    })
  }

  pub fn decode(self) -> Result<PartnerStore> {
    Ok(PartnerStore {
      store_id:        decode_uuid(&self.store_id)?,
      name:            self.name,
      base_url:        self.base_url,
      affiliate_tag:   self.affiliate_tag,
      search_template: self.search_template,
      cart_strategy:   CartStrategy::from_tag(&self.cart_strategy),
      is_active:       self.is_active,
      display_order:   self.display_order,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawSchool {
  pub school_id:  String,
  pub name:       String,
  pub cep:        String,
  pub city:       String,
  pub state:      String,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub created_at: String,
}

impl RawSchool {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      school_id:  row.get(0)?,
      name:       row.get(1)?,
      cep:        row.get(2)?,
      city:       row.get(3)?,
      state:      row.get(4)?,
      latitude:   row.get(5)?,
      longitude:  row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn decode(self) -> Result<School> {
    Ok(School {
      school_id:  decode_uuid(&self.school_id)?,
      name:       self.name,
      cep:        self.cep,
      city:       self.city,
      state:      self.state,
      latitude:   self.latitude,
      longitude:  self.longitude,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCepCoordinate {
  pub cep:        String,
  pub latitude:   f64,
  pub longitude:  f64,
  pub address:    Option<String>,
  pub city:       Option<String>,
  pub state:      Option<String>,
  pub source:     String,
  pub updated_at: String,
}

impl RawCepCoordinate {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      cep:        row.get(0)?,
      latitude:   row.get(1)?,
      longitude:  row.get(2)?,
      address:    row.get(3)?,
      city:       row.get(4)?,
      state:      row.get(5)?,
      source:     row.get(6)?,
      updated_at: row.get(7)?,
    })
  }

  pub fn decode(self) -> Result<CepCoordinate> {
    Ok(CepCoordinate {
      cep:        self.cep,
      latitude:   self.latitude,
      longitude:  self.longitude,
      address:    self.address,
      city:       self.city,
      state:      self.state,
      source:     self.source,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
