//! SQL schema for the listou SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS schools (
    school_id  TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    cep        TEXT NOT NULL,      -- normalised, digits only
    city       TEXT NOT NULL,
    state      TEXT NOT NULL,
    latitude   REAL,
    longitude  REAL,
    created_at TEXT NOT NULL       -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS lists (
    list_id    TEXT PRIMARY KEY,
    school_id  TEXT REFERENCES schools(school_id),
    title      TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Item order within a list is insertion order (rowid).
CREATE TABLE IF NOT EXISTS items (
    item_id        TEXT PRIMARY KEY,
    list_id        TEXT NOT NULL REFERENCES lists(list_id),
    name           TEXT NOT NULL,
    search_query   TEXT,           -- explicit override; NULL = use name
    quantity       INTEGER NOT NULL DEFAULT 1,
    unit           TEXT,
    price_estimate REAL
);

CREATE TABLE IF NOT EXISTS partner_stores (
    store_id        TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    base_url        TEXT NOT NULL,
    affiliate_tag   TEXT,
    search_template TEXT NOT NULL, -- {{base_url}}/{{query}}/{{affiliate_tag}}
    cart_strategy   TEXT NOT NULL DEFAULT 'search',
    is_active       INTEGER NOT NULL DEFAULT 1,
    display_order   INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

-- Attribution events are strictly append-only.
-- No UPDATE or DELETE is ever issued against these three tables.
CREATE TABLE IF NOT EXISTS click_events (
    click_id   TEXT PRIMARY KEY,
    item_id    TEXT,
    store_id   TEXT NOT NULL,
    school_id  TEXT,
    list_id    TEXT,
    session_id TEXT,
    user_agent TEXT,
    referrer   TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS list_view_events (
    view_id    TEXT PRIMARY KEY,
    list_id    TEXT NOT NULL,
    session_id TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cep_search_events (
    cep        TEXT NOT NULL,      -- normalised prefix or full code
    created_at TEXT NOT NULL
);

-- CEP coordinate cache. Upserted on miss, read forever after; no TTL.
CREATE TABLE IF NOT EXISTS cep_coordinates (
    cep        TEXT PRIMARY KEY,   -- normalised full code
    latitude   REAL NOT NULL,
    longitude  REAL NOT NULL,
    address    TEXT,
    city       TEXT,
    state      TEXT,
    source     TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Materialised aggregates, rebuilt wholesale by the cache-refresh endpoint.
CREATE TABLE IF NOT EXISTS popular_schools (
    school_id    TEXT PRIMARY KEY,
    click_count  INTEGER NOT NULL,
    refreshed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS popular_lists (
    list_id      TEXT PRIMARY KEY,
    view_count   INTEGER NOT NULL,
    refreshed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS items_list_idx       ON items(list_id);
CREATE INDEX IF NOT EXISTS stores_active_idx    ON partner_stores(is_active, display_order);
CREATE INDEX IF NOT EXISTS clicks_school_idx    ON click_events(school_id);
CREATE INDEX IF NOT EXISTS views_list_idx       ON list_view_events(list_id);
CREATE INDEX IF NOT EXISTS cep_search_cep_idx   ON cep_search_events(cep);
CREATE INDEX IF NOT EXISTS schools_cep_idx      ON schools(cep);

PRAGMA user_version = 1;
";
