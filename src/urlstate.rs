//! Bidirectional sync between filter state and the navigable address.

use crate::filter::FilterState;
use crate::history::{History, Location};
use crate::resource::ResourceFamily;

/// Binds a resource family's filter state to the address query string.
///
/// `read` is total: malformed page/size fall back to defaults and empty
/// fields are dropped, so any address decodes to a well-formed state.
/// `write` owns the page-reset rule: editing a filter while deep in the
/// result set returns the view to page 0, because the result set itself
/// has changed. Pure history navigation goes through `read` only and
/// therefore never resets anything.
pub struct UrlStateBinder {
  default_size: u32,
}

impl UrlStateBinder {
  pub fn for_family(family: &ResourceFamily) -> Self {
    Self {
      default_size: family.default_size(),
    }
  }

  pub fn with_default_size(default_size: u32) -> Self {
    Self {
      default_size: default_size.max(1),
    }
  }

  /// Decode the location's query component into a filter state.
  pub fn read(&self, location: &Location) -> FilterState {
    let mut state = FilterState::new(self.default_size);
    for (name, value) in url::form_urlencoded::parse(location.query.as_bytes()) {
      match name.as_ref() {
        "page" => state = state.with_page(value.parse().unwrap_or(0)),
        "size" => {
          state = state.with_size(value.parse().unwrap_or(self.default_size));
        }
        _ => state = state.with_field(&name, &value),
      }
    }
    state
  }

  /// Encode `next` onto the history as a new location.
  ///
  /// Whenever any field other than page/size differs from the current
  /// address's decoded state, the page resets to 0. Writing a state that
  /// encodes to the current address is a no-op (no duplicate entries).
  pub fn write(&self, history: &mut History, next: &FilterState) {
    let current = self.read(history.current());
    let next = if next.filters_differ(&current) {
      next.with_page(0)
    } else {
      next.clone()
    };

    let location = Location::with_query(&history.current().path, &next.canonical_query());
    if location == *history.current() {
      return;
    }
    history.push(location);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn binder() -> UrlStateBinder {
    UrlStateBinder::for_family(&ResourceFamily::listings())
  }

  #[test]
  fn test_read_defaults_when_absent() {
    let state = binder().read(&Location::new("/api/listings"));
    assert_eq!(state.page(), 0);
    assert_eq!(state.size(), 12);
  }

  #[test]
  fn test_read_corrects_malformed_numbers() {
    let state = binder().read(&Location::parse("/api/listings?page=banana&size=-3&q=pipe"));
    assert_eq!(state.page(), 0);
    assert_eq!(state.size(), 12);
    assert_eq!(state.field("q"), Some("pipe"));
  }

  #[test]
  fn test_read_drops_empty_fields() {
    let state = binder().read(&Location::parse("/api/listings?q=&minPrice=10"));
    assert_eq!(state.field("q"), None);
    assert_eq!(state.field("minPrice"), Some("10"));
  }

  #[test]
  fn test_reload_reproduces_the_same_view() {
    let binder = binder();
    let state = binder
      .read(&Location::new("/api/listings"))
      .with_field("q", "plumbing")
      .with_page(2);
    let mut history = History::new(Location::new("/api/listings"));
    binder.write(&mut history, &state);

    let reloaded = binder.read(&Location::parse(&history.current().to_string()));
    assert_eq!(reloaded, state.with_page(0));
  }

  #[test]
  fn test_filter_change_resets_page() {
    let binder = binder();
    let mut history = History::new(Location::parse("/api/listings?page=5&q=pipe&size=12"));

    let next = binder.read(history.current()).with_field("q", "wiring");
    binder.write(&mut history, &next);

    let state = binder.read(history.current());
    assert_eq!(state.page(), 0);
    assert_eq!(state.field("q"), Some("wiring"));
  }

  #[test]
  fn test_page_change_keeps_filters() {
    let binder = binder();
    let mut history = History::new(Location::parse("/api/listings?page=0&q=pipe&size=12"));

    let next = binder.read(history.current()).with_page(3);
    binder.write(&mut history, &next);

    let state = binder.read(history.current());
    assert_eq!(state.page(), 3);
    assert_eq!(state.field("q"), Some("pipe"));
  }

  #[test]
  fn test_history_navigation_never_resets_page() {
    let binder = binder();
    let mut history = History::new(Location::parse("/api/listings?page=0&q=pipe&size=12"));
    let next = binder.read(history.current()).with_page(4);
    binder.write(&mut history, &next);

    // Going back and forward re-derives state from the address.
    assert!(history.back());
    assert_eq!(binder.read(history.current()).page(), 0);
    assert!(history.forward());
    assert_eq!(binder.read(history.current()).page(), 4);
    assert_eq!(binder.read(history.current()).field("q"), Some("pipe"));
  }

  #[test]
  fn test_identical_write_is_a_no_op() {
    let binder = binder();
    let initial = Location::parse("/api/listings?page=0&q=pipe&size=12");
    let mut history = History::new(initial);

    let same = binder.read(history.current());
    binder.write(&mut history, &same);
    assert!(!history.can_go_back());
  }
}
