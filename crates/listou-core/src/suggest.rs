//! CEP autocomplete: the suggestion projection, the debounced query gate,
//! and the suggestion-box selection state machine.
//!
//! The ranking behind a suggestion is computed by the store (schools and
//! logged searches grouped by CEP); this module only defines the shape and
//! the client-side interaction rules. The state machine is plain data with
//! explicit transitions so the keyboard semantics are testable without a UI.

use serde::{Deserialize, Serialize};

use crate::cep::{format_cep, normalize_cep};

/// Debounce window for autocomplete queries while the user types.
pub const SUGGEST_DEBOUNCE_MS: u64 = 150;

/// No query is issued below this many normalised digits.
pub const SUGGEST_MIN_PREFIX_LEN: usize = 2;

/// Default cap on returned suggestions.
pub const SUGGEST_DEFAULT_LIMIT: usize = 6;

// ─── Suggestion ──────────────────────────────────────────────────────────────

/// A ranked CEP suggestion. Read-only projection over school and search data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CepSuggestion {
  /// Normalised full CEP.
  pub cep:          String,
  pub city:         String,
  pub state:        String,
  /// Schools registered under this CEP.
  pub school_count: u64,
  /// Historical searches for this CEP.
  pub search_count: u64,
}

impl CepSuggestion {
  /// Display form of the code (`NNNNN-NNN`).
  pub fn display_cep(&self) -> String {
    format_cep(&self.cep)
  }
}

// ─── Query gate ──────────────────────────────────────────────────────────────

/// Decides, after the debounce window has elapsed, whether typed input
/// warrants a query.
///
/// The timer itself belongs to the caller ([`SUGGEST_DEBOUNCE_MS`]); the gate
/// enforces the other two rules: at least [`SUGGEST_MIN_PREFIX_LEN`] digits,
/// and exactly one query per distinct normalised prefix.
#[derive(Debug, Default)]
pub struct QueryGate {
  last_issued: Option<String>,
}

impl QueryGate {
  pub fn new() -> Self {
    Self::default()
  }

  /// Feed the debounced input value. Returns the normalised prefix to query,
  /// or `None` when no query should be issued.
  pub fn accept(&mut self, raw: &str) -> Option<String> {
    let prefix = normalize_cep(raw);
    if prefix.len() < SUGGEST_MIN_PREFIX_LEN {
      return None;
    }
    if self.last_issued.as_deref() == Some(prefix.as_str()) {
      return None;
    }
    self.last_issued = Some(prefix.clone());
    Some(prefix)
  }
}

// ─── Suggestion box ──────────────────────────────────────────────────────────

/// Selection state for an open suggestion list.
///
/// The highlighted index is conceptually clamped to `[-1, len - 1]`, with
/// `-1` (here `None`) meaning "nothing highlighted".
#[derive(Debug, Default)]
pub struct SuggestionBox {
  items:       Vec<CepSuggestion>,
  highlighted: Option<usize>,
  open:        bool,
}

impl SuggestionBox {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the visible suggestions. Opens the box when non-empty and
  /// resets the highlight.
  pub fn set_items(&mut self, items: Vec<CepSuggestion>) {
    self.open = !items.is_empty();
    self.items = items;
    self.highlighted = None;
  }

  pub fn is_open(&self) -> bool {
    self.open
  }

  pub fn items(&self) -> &[CepSuggestion] {
    &self.items
  }

  pub fn highlighted(&self) -> Option<usize> {
    self.highlighted.filter(|_| self.open)
  }

  /// ArrowDown: move the highlight down, saturating at the last item.
  pub fn key_down(&mut self) {
    if !self.open || self.items.is_empty() {
      return;
    }
    self.highlighted = Some(match self.highlighted {
      None => 0,
      Some(i) => (i + 1).min(self.items.len() - 1),
    });
  }

  /// ArrowUp: move the highlight up; above the first item it clears back to
  /// "nothing highlighted".
  pub fn key_up(&mut self) {
    self.highlighted = match self.highlighted {
      Some(0) | None => None,
      Some(i) => Some(i - 1),
    };
  }

  /// Enter: commit the highlighted suggestion, if any, and close the box.
  /// With nothing highlighted, Enter does not commit.
  pub fn enter(&mut self) -> Option<CepSuggestion> {
    let committed = self
      .highlighted()
      .and_then(|i| self.items.get(i).cloned())?;
    self.close();
    Some(committed)
  }

  /// Escape: close without committing.
  pub fn escape(&mut self) {
    self.close();
  }

  /// A click outside the control: close without committing.
  pub fn click_outside(&mut self) {
    self.close();
  }

  fn close(&mut self) {
    self.open = false;
    self.highlighted = None;
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn suggestion(cep: &str) -> CepSuggestion {
    CepSuggestion {
      cep:          cep.to_string(),
      city:         "São Paulo".to_string(),
      state:        "SP".to_string(),
      school_count: 3,
      search_count: 10,
    }
  }

  // ── QueryGate ───────────────────────────────────────────────────────────

  #[test]
  fn gate_issues_nothing_below_two_digits() {
    let mut gate = QueryGate::new();
    assert_eq!(gate.accept(""), None);
    assert_eq!(gate.accept("0"), None);
    assert_eq!(gate.accept("a-"), None);
  }

  #[test]
  fn gate_issues_one_query_per_distinct_prefix() {
    let mut gate = QueryGate::new();
    assert_eq!(gate.accept("01"), Some("01".to_string()));
    // Same prefix again (e.g. the user typed and deleted a hyphen).
    assert_eq!(gate.accept("01-"), None);
    assert_eq!(gate.accept("013"), Some("013".to_string()));
    assert_eq!(gate.accept("013"), None);
  }

  #[test]
  fn gate_normalises_before_comparing() {
    let mut gate = QueryGate::new();
    assert_eq!(gate.accept("01310-1"), Some("013101".to_string()));
    assert_eq!(gate.accept("013101"), None);
  }

  // ── SuggestionBox ───────────────────────────────────────────────────────

  #[test]
  fn arrows_clamp_to_bounds() {
    let mut sb = SuggestionBox::new();
    sb.set_items(vec![suggestion("01310100"), suggestion("01310200")]);

    assert_eq!(sb.highlighted(), None);
    sb.key_up();
    assert_eq!(sb.highlighted(), None);

    sb.key_down();
    assert_eq!(sb.highlighted(), Some(0));
    sb.key_down();
    assert_eq!(sb.highlighted(), Some(1));
    sb.key_down(); // saturates at len - 1
    assert_eq!(sb.highlighted(), Some(1));

    sb.key_up();
    assert_eq!(sb.highlighted(), Some(0));
    sb.key_up(); // back to "nothing highlighted"
    assert_eq!(sb.highlighted(), None);
  }

  #[test]
  fn enter_commits_only_when_highlighted() {
    let mut sb = SuggestionBox::new();
    sb.set_items(vec![suggestion("01310100")]);

    assert_eq!(sb.enter(), None);
    assert!(sb.is_open());

    sb.key_down();
    let committed = sb.enter().expect("highlighted suggestion");
    assert_eq!(committed.cep, "01310100");
    assert!(!sb.is_open());
  }

  #[test]
  fn escape_and_click_outside_close_without_committing() {
    let mut sb = SuggestionBox::new();
    sb.set_items(vec![suggestion("01310100")]);
    sb.key_down();

    sb.escape();
    assert!(!sb.is_open());
    assert_eq!(sb.highlighted(), None);

    sb.set_items(vec![suggestion("01310100")]);
    sb.click_outside();
    assert!(!sb.is_open());
  }

  #[test]
  fn empty_result_set_keeps_box_closed() {
    let mut sb = SuggestionBox::new();
    sb.set_items(Vec::new());
    assert!(!sb.is_open());
    sb.key_down();
    assert_eq!(sb.highlighted(), None);
  }

  #[test]
  fn display_cep_is_hyphenated() {
    assert_eq!(suggestion("01310100").display_cep(), "01310-100");
  }
}
