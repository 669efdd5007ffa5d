//! Filter and pagination state for list views.

use std::collections::BTreeMap;

/// Immutable snapshot of the query parameters behind a list view.
///
/// `page` is zero-based and `size` is always positive; every other field is
/// a named text filter. Empty or absent values are never stored, so
/// `{q: ""}` and `{}` compare equal and derive the same cache identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  page: u32,
  size: u32,
  fields: BTreeMap<String, String>,
}

impl FilterState {
  /// Create an empty state at page 0 with the given page size.
  pub fn new(size: u32) -> Self {
    Self {
      page: 0,
      size: size.max(1),
      fields: BTreeMap::new(),
    }
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn size(&self) -> u32 {
    self.size
  }

  pub fn field(&self, name: &str) -> Option<&str> {
    self.fields.get(name).map(String::as_str)
  }

  /// Named filter fields in lexicographic order.
  pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .fields
      .iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Copy with the given field set. An empty value clears the field
  /// instead of storing an empty string. `page` and `size` route to their
  /// dedicated setters; malformed numbers fall back to the current value.
  pub fn with_field(&self, name: &str, value: &str) -> Self {
    match name {
      "page" => self.with_page(value.parse().unwrap_or(0)),
      "size" => self.with_size(value.parse().unwrap_or(self.size)),
      _ => {
        let mut next = self.clone();
        if value.is_empty() {
          next.fields.remove(name);
        } else {
          next.fields.insert(name.to_string(), value.to_string());
        }
        next
      }
    }
  }

  pub fn with_page(&self, page: u32) -> Self {
    let mut next = self.clone();
    next.page = page;
    next
  }

  pub fn with_size(&self, size: u32) -> Self {
    let mut next = self.clone();
    next.size = size.max(1);
    next
  }

  /// True when the two states differ in any field other than page/size.
  /// This is the condition that sends a view back to page 0.
  pub fn filters_differ(&self, other: &FilterState) -> bool {
    self.fields != other.fields
  }

  /// Canonical `name=value` query encoding: names sorted lexicographically,
  /// empty fields absent, `page` and `size` always present. Two
  /// semantically equal states encode identically regardless of the order
  /// their fields were set in.
  pub fn canonical_query(&self) -> String {
    let mut pairs: BTreeMap<&str, String> = self
      .fields
      .iter()
      .map(|(k, v)| (k.as_str(), v.clone()))
      .collect();
    pairs.insert("page", self.page.to_string());
    pairs.insert("size", self.size.to_string());

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
      serializer.append_pair(name, &value);
    }
    serializer.finish()
  }
}
