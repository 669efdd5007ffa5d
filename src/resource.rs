//! Resource family registry.
//!
//! A resource family is a named collection of entities sharing one
//! invalidation scope: when any entity in the family is written, every
//! cached page for the family goes stale together.

/// A named server collection with its client-side paging default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFamily {
  name: String,
  collection: String,
  default_size: u32,
}

impl ResourceFamily {
  pub fn new(name: &str, collection: &str, default_size: u32) -> Self {
    Self {
      name: name.to_string(),
      collection: collection.to_string(),
      default_size: default_size.max(1),
    }
  }

  /// Family tag used in cache keys and invalidation.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Collection path, e.g. `/api/listings`.
  pub fn collection(&self) -> &str {
    &self.collection
  }

  pub fn default_size(&self) -> u32 {
    self.default_size
  }

  /// Path of a single entity, e.g. `/api/listings/7`.
  pub fn item_path(&self, id: i64) -> String {
    format!("{}/{}", self.collection, id)
  }

  /// Path of an entity action, e.g. `/api/admin/users/7/toggle-active`.
  pub fn action_path(&self, id: i64, action: &str) -> String {
    format!("{}/{}/{}", self.collection, id, action)
  }

  /// Return a copy with a different default page size.
  pub fn with_default_size(mut self, size: u32) -> Self {
    self.default_size = size.max(1);
    self
  }

  // Built-in ServiceLink families.

  pub fn listings() -> Self {
    Self::new("listings", "/api/listings", 12)
  }

  pub fn admin_users() -> Self {
    Self::new("admin-users", "/api/admin/users", 20)
  }

  pub fn admin_categories() -> Self {
    Self::new("admin-categories", "/api/admin/categories", 50)
  }

  pub fn bookings() -> Self {
    Self::new("bookings", "/api/bookings", 12)
  }

  pub fn builtin() -> Vec<Self> {
    vec![
      Self::listings(),
      Self::admin_users(),
      Self::admin_categories(),
      Self::bookings(),
    ]
  }

  /// Look up a built-in family by its tag.
  pub fn by_name(name: &str) -> Option<Self> {
    Self::builtin().into_iter().find(|f| f.name == name)
  }
}
