//! Serde-deserializable types matching ServiceLink API responses.
//!
//! Wire records are lenient about optional fields so older servers stay
//! readable; domain-level behavior lives elsewhere.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Re-serialize a value through JSON to convert between compatible types.
/// Used to turn untyped cached pages into typed records.
pub fn reserialize<T: DeserializeOwned>(value: impl Serialize) -> serde_json::Result<T> {
  serde_json::from_value(serde_json::to_value(value)?)
}

/// One page of a collection read.
///
/// `content.len()` never exceeds the requested size; `total_elements` is
/// the full matching count independent of pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  #[serde(default = "Vec::new")]
  pub content: Vec<T>,
  #[serde(rename = "totalElements", default)]
  pub total_elements: u64,
}

impl<T> Page<T> {
  pub fn is_empty(&self) -> bool {
    self.content.is_empty()
  }

  /// Number of pages at the given size (at least 1 page-size).
  pub fn total_pages(&self, size: u32) -> u64 {
    let size = u64::from(size.max(1));
    self.total_elements.div_ceil(size)
  }
}

// ============================================================================
// Collection records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub price: f64,
  #[serde(default)]
  pub owner_id: Option<i64>,
  #[serde(default)]
  pub owner_name: Option<String>,
  #[serde(default)]
  pub category_id: Option<i64>,
  #[serde(default)]
  pub category_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  pub id: i64,
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub active: bool,
  #[serde(default)]
  pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
  pub id: i64,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub listing_id: Option<i64>,
  #[serde(default)]
  pub listing_title: Option<String>,
  #[serde(default)]
  pub scheduled_at: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_page_deserializes_wire_shape() {
    let page: Page<ListingRecord> = serde_json::from_value(json!({
      "content": [
        {"id": 1, "title": "Drain cleaning", "price": 80.0, "categoryName": "Plumbing"}
      ],
      "totalElements": 25
    }))
    .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total_elements, 25);
    assert_eq!(page.content[0].category_name.as_deref(), Some("Plumbing"));
  }

  #[test]
  fn test_page_tolerates_missing_fields() {
    let page: Page<ListingRecord> = serde_json::from_value(json!({})).unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_elements, 0);
  }

  #[test]
  fn test_total_pages() {
    let page = Page::<serde_json::Value> {
      content: Vec::new(),
      total_elements: 25,
    };
    assert_eq!(page.total_pages(12), 3);
    assert_eq!(page.total_pages(25), 1);
    let empty = Page::<serde_json::Value> {
      content: Vec::new(),
      total_elements: 0,
    };
    assert_eq!(empty.total_pages(12), 0);
  }

  #[test]
  fn test_reserialize_typed_from_untyped() {
    let untyped: Page<serde_json::Value> = serde_json::from_value(json!({
      "content": [{"id": 3, "name": "Plumbing", "icon": "🔧"}],
      "totalElements": 1
    }))
    .unwrap();
    let typed: Page<CategoryRecord> = reserialize(&untyped).unwrap();
    assert_eq!(typed.content[0].name, "Plumbing");
  }
}
