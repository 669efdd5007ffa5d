//! Cache key derivation.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::filter::FilterState;

/// Canonical cache identity for one resource family and filter state.
///
/// Built purely from the filter's canonical query encoding, so two states
/// that are set-equal after dropping empty fields always produce the same
/// key, whatever order their fields were written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
  family: String,
  canonical: String,
}

impl QueryKey {
  /// Derive the key for a filter state. Pure and total: no I/O, no failure
  /// for any well-formed state.
  pub fn build(family: &str, filter: &FilterState) -> Self {
    Self {
      family: family.to_string(),
      canonical: filter.canonical_query(),
    }
  }

  pub fn family(&self) -> &str {
    &self.family
  }

  /// Sorted `name=value` query component, page and size included.
  pub fn canonical(&self) -> &str {
    &self.canonical
  }

  /// SHA256 hash for stable, fixed-length handles (in-flight dedup, logs).
  pub fn hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.family.as_bytes());
    hasher.update(b"?");
    hasher.update(self.canonical.as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}?{}", self.family, self.canonical)
  }
}
