//! Purchase-link construction: query normalisation and URL template
//! expansion.
//!
//! Both the single-link resolver and the bulk cart builder go through these
//! two functions. Keeping one implementation is an invariant, not a
//! convenience: the URL stored in the click-event log and the URL the user
//! actually opens must never diverge.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, catalog::PartnerStore, item::Item};

// ─── Query normalisation ─────────────────────────────────────────────────────

/// Fold a Latin character with a diacritic to its base ASCII letter.
///
/// Covers the accented letters that occur in Portuguese item names (plus a
/// few neighbours). Everything else passes through unchanged.
fn fold_diacritic(c: char) -> char {
  match c {
    'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
    'é' | 'è' | 'ê' | 'ë' => 'e',
    'í' | 'ì' | 'î' | 'ï' => 'i',
    'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
    'ú' | 'ù' | 'û' | 'ü' => 'u',
    'ç' => 'c',
    'ñ' => 'n',
    'ý' | 'ÿ' => 'y',
    other => other,
  }
}

/// Convert free text into a URL-safe search term.
///
/// Lowercases, strips diacritics, drops everything outside `[a-z0-9\s]`, and
/// joins the remaining words with `+`. Empty input yields an empty string.
///
/// `+` itself is treated as a word separator so the function is idempotent:
/// `normalize_query(normalize_query(s)) == normalize_query(s)`.
pub fn normalize_query(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut pending_sep = false;

  for c in input.chars().flat_map(char::to_lowercase).map(fold_diacritic) {
    if c.is_ascii_alphanumeric() {
      if pending_sep && !out.is_empty() {
        out.push('+');
      }
      pending_sep = false;
      out.push(c);
    } else if c.is_whitespace() || c == '+' {
      pending_sep = true;
    }
    // Symbols, ordinals (º, ª) and other punctuation are dropped outright.
  }

  out
}

// ─── Template expansion ──────────────────────────────────────────────────────

/// Expand a store's URL template.
///
/// Substitutes `{{base_url}}`, `{{query}}` and `{{affiliate_tag}}` (the tag
/// or the empty string). When no affiliate tag exists, dangling tag syntax
/// left behind by the template is cleaned up textually: `&tag=` fragments are
/// removed, `?tag=` collapses to `?`, and a single trailing bare `?` is
/// stripped.
///
/// This is a string post-process, not URL parsing. Stored templates embed
/// `tag=` literals and depend on exactly this behaviour; do not replace it
/// with a structured query-string builder without migrating every template.
pub fn expand_template(
  template: &str,
  base_url: &str,
  affiliate_tag: Option<&str>,
  encoded_query: &str,
) -> String {
  let mut url = template
    .replace("{{base_url}}", base_url)
    .replace("{{query}}", encoded_query)
    .replace("{{affiliate_tag}}", affiliate_tag.unwrap_or(""));

  if affiliate_tag.is_none() {
    url = url.replace("&tag=", "").replace("?tag=", "?");
    if let Some(stripped) = url.strip_suffix('?') {
      url.truncate(stripped.len());
    }
  }

  url
}

// ─── Resolved link ───────────────────────────────────────────────────────────

/// A purchase URL for one (item, store) pair. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLink {
  pub url:        String,
  pub store_name: String,
  pub item_name:  String,
}

/// Build the outbound purchase link for `item` at `store`.
///
/// Pure and deterministic given the item, the store's current template and
/// affiliate tag. Existence and active-flag checks are the caller's job.
pub fn build_link(item: &Item, store: &PartnerStore) -> ResolvedLink {
  let query = normalize_query(item.raw_query());
  let url = expand_template(
    &store.search_template,
    &store.base_url,
    store.affiliate_tag.as_deref(),
    &query,
  );
  ResolvedLink {
    url,
    store_name: store.name.clone(),
    item_name: item.name.clone(),
  }
}

/// Like [`build_link`], but refuses deactivated stores.
///
/// This is the entry point for user-facing resolution; [`build_link`] stays
/// available for bulk cart building, where the caller has already filtered
/// to active stores.
pub fn resolve_link(item: &Item, store: &PartnerStore) -> Result<ResolvedLink> {
  if !store.is_active {
    return Err(Error::StoreInactive(store.store_id));
  }
  Ok(build_link(item, store))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
