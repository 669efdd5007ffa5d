//! Navigable address and history stack.
//!
//! A headless client has no browser chrome, so the address a view lives at
//! is modeled explicitly: a `Location` (path plus query component) and a
//! `History` with back/forward semantics. The query string is the sole
//! persisted client-side state; reloading or sharing a location must
//! reproduce the same view.

use std::fmt;

/// One navigable address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub path: String,
  pub query: String,
}

impl Location {
  pub fn new(path: &str) -> Self {
    Self {
      path: path.to_string(),
      query: String::new(),
    }
  }

  pub fn with_query(path: &str, query: &str) -> Self {
    Self {
      path: path.to_string(),
      query: query.to_string(),
    }
  }

  /// Parse a `path?query` string; a missing query component means empty.
  pub fn parse(address: &str) -> Self {
    match address.split_once('?') {
      Some((path, query)) => Self::with_query(path, query),
      None => Self::new(address),
    }
  }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.query.is_empty() {
      write!(f, "{}", self.path)
    } else {
      write!(f, "{}?{}", self.path, self.query)
    }
  }
}

/// Linear history with a cursor, like a browser session.
#[derive(Debug, Clone)]
pub struct History {
  stack: Vec<Location>,
  cursor: usize,
}

impl History {
  pub fn new(initial: Location) -> Self {
    Self {
      stack: vec![initial],
      cursor: 0,
    }
  }

  pub fn current(&self) -> &Location {
    &self.stack[self.cursor]
  }

  /// Navigate to a new location, truncating any forward entries.
  pub fn push(&mut self, location: Location) {
    self.stack.truncate(self.cursor + 1);
    self.stack.push(location);
    self.cursor += 1;
  }

  /// Replace the current location without adding a history entry.
  pub fn replace(&mut self, location: Location) {
    self.stack[self.cursor] = location;
  }

  /// Move back one entry; false when already at the start.
  pub fn back(&mut self) -> bool {
    if self.cursor == 0 {
      return false;
    }
    self.cursor -= 1;
    true
  }

  /// Move forward one entry; false when already at the end.
  pub fn forward(&mut self) -> bool {
    if self.cursor + 1 >= self.stack.len() {
      return false;
    }
    self.cursor += 1;
    true
  }

  pub fn can_go_back(&self) -> bool {
    self.cursor > 0
  }

  pub fn can_go_forward(&self) -> bool {
    self.cursor + 1 < self.stack.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_splits_query() {
    let loc = Location::parse("/api/listings?page=0&size=12");
    assert_eq!(loc.path, "/api/listings");
    assert_eq!(loc.query, "page=0&size=12");
    assert_eq!(loc.to_string(), "/api/listings?page=0&size=12");

    let bare = Location::parse("/api/listings");
    assert!(bare.query.is_empty());
    assert_eq!(bare.to_string(), "/api/listings");
  }

  #[test]
  fn test_push_back_forward() {
    let mut history = History::new(Location::parse("/a?x=1"));
    history.push(Location::parse("/a?x=2"));
    history.push(Location::parse("/a?x=3"));

    assert_eq!(history.current().query, "x=3");
    assert!(history.back());
    assert_eq!(history.current().query, "x=2");
    assert!(history.forward());
    assert_eq!(history.current().query, "x=3");
    assert!(!history.forward());
  }

  #[test]
  fn test_push_truncates_forward_entries() {
    let mut history = History::new(Location::parse("/a?x=1"));
    history.push(Location::parse("/a?x=2"));
    history.back();
    history.push(Location::parse("/a?x=9"));

    assert_eq!(history.current().query, "x=9");
    assert!(!history.can_go_forward());
    assert!(history.back());
    assert_eq!(history.current().query, "x=1");
  }

  #[test]
  fn test_back_stops_at_start() {
    let mut history = History::new(Location::parse("/a"));
    assert!(!history.back());
    assert_eq!(history.current().path, "/a");
  }

  #[test]
  fn test_replace_keeps_stack_depth() {
    let mut history = History::new(Location::parse("/a?x=1"));
    history.replace(Location::parse("/a?x=2"));
    assert_eq!(history.current().query, "x=2");
    assert!(!history.can_go_back());
  }
}
