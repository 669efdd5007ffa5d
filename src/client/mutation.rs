//! Writes and the cache invalidation they trigger.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::SyncError;
use crate::resource::ResourceFamily;

use super::{Transport, Verb};

/// One logical write against a resource family.
#[derive(Debug, Clone)]
pub enum Mutation {
  /// `POST <collection>` with the entity sans id.
  Create { body: Value },
  /// `PUT <collection>/<id>` with the full entity.
  Update { id: i64, body: Value },
  /// `PATCH <collection>/<id>/<action>`, no body. The server computes and
  /// returns the resulting state; the client never guesses it.
  Toggle { id: i64, action: String },
  /// `DELETE <collection>/<id>`.
  Delete { id: i64 },
}

/// Executes writes and invalidates the affected family on success.
///
/// Consistency after a write comes from invalidation plus refetch, never
/// from optimistic local mutation of cached pages. On failure the cache is
/// untouched, so the displayed list still reflects the last known-good
/// server state.
pub struct MutationCoordinator {
  store: Arc<CacheStore>,
  transport: Arc<dyn Transport>,
}

impl MutationCoordinator {
  pub fn new(store: Arc<CacheStore>, transport: Arc<dyn Transport>) -> Self {
    Self { store, transport }
  }

  /// Execute the mutation and, on success, mark every cached page of the
  /// family stale so the next read refetches.
  pub async fn mutate(
    &self,
    family: &ResourceFamily,
    mutation: Mutation,
  ) -> Result<Option<Value>, SyncError> {
    let (verb, path, body) = match mutation {
      Mutation::Create { body } => (Verb::Post, family.collection().to_string(), Some(body)),
      Mutation::Update { id, body } => (Verb::Put, family.item_path(id), Some(body)),
      Mutation::Toggle { id, action } => (Verb::Patch, family.action_path(id, &action), None),
      Mutation::Delete { id } => (Verb::Delete, family.item_path(id), None),
    };

    match self.transport.send_json(verb, &path, body).await {
      Ok(response) => {
        debug!(family = family.name(), %path, "mutation committed, invalidating");
        self.store.invalidate(family.name());
        Ok(response)
      }
      Err(err) => {
        warn!(family = family.name(), %path, error = %err, "mutation failed");
        Err(err)
      }
    }
  }

  pub async fn create(
    &self,
    family: &ResourceFamily,
    body: Value,
  ) -> Result<Option<Value>, SyncError> {
    self.mutate(family, Mutation::Create { body }).await
  }

  pub async fn update(
    &self,
    family: &ResourceFamily,
    id: i64,
    body: Value,
  ) -> Result<Option<Value>, SyncError> {
    self.mutate(family, Mutation::Update { id, body }).await
  }

  pub async fn toggle(
    &self,
    family: &ResourceFamily,
    id: i64,
    action: &str,
  ) -> Result<Option<Value>, SyncError> {
    self
      .mutate(
        family,
        Mutation::Toggle {
          id,
          action: action.to_string(),
        },
      )
      .await
  }

  pub async fn delete(&self, family: &ResourceFamily, id: i64) -> Result<Option<Value>, SyncError> {
    self.mutate(family, Mutation::Delete { id }).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::QueryKey;
  use crate::client::fetcher::Fetcher;
  use crate::client::testutil::MemoryTransport;
  use crate::filter::FilterState;
  use serde_json::json;

  fn category(id: i64, name: &str) -> Value {
    json!({"id": id, "name": name, "icon": null})
  }

  fn setup(rows: Vec<Value>) -> (Arc<MemoryTransport>, Arc<CacheStore>, Fetcher, MutationCoordinator) {
    let transport = Arc::new(
      MemoryTransport::new().with_collection("/api/admin/categories", rows),
    );
    let store = Arc::new(CacheStore::new());
    let fetcher = Fetcher::new(Arc::clone(&store), Arc::clone(&transport) as Arc<dyn Transport>);
    let coordinator =
      MutationCoordinator::new(Arc::clone(&store), Arc::clone(&transport) as Arc<dyn Transport>);
    (transport, store, fetcher, coordinator)
  }

  #[tokio::test]
  async fn test_successful_mutation_invalidates_family() {
    let (_transport, store, fetcher, coordinator) =
      setup(vec![category(1, "Plumbing"), category(2, "Electrical")]);
    let family = ResourceFamily::admin_categories();
    let filter = FilterState::new(50);

    fetcher.fetch(&family, &filter).await.unwrap();
    let key = QueryKey::build(family.name(), &filter);
    let before = store.get(&key).unwrap().version;

    coordinator
      .create(&family, json!({"name": "Gardening", "icon": "🌿"}))
      .await
      .unwrap();

    let entry = store.get(&key).unwrap();
    assert!(entry.version > before);
    assert!(!entry.is_fresh());
  }

  #[tokio::test]
  async fn test_failed_mutation_leaves_cache_untouched() {
    let (transport, store, fetcher, coordinator) = setup(vec![category(1, "Plumbing")]);
    let family = ResourceFamily::admin_categories();
    let filter = FilterState::new(50);

    fetcher.fetch(&family, &filter).await.unwrap();
    let key = QueryKey::build(family.name(), &filter);
    let before = store.get(&key).unwrap();

    transport.set_fail_writes(true);
    let err = coordinator.delete(&family, 1).await.unwrap_err();
    assert!(matches!(err, SyncError::Api { status: 500, .. }));

    let after = store.get(&key).unwrap();
    assert_eq!(after.version, before.version);
    assert!(after.is_fresh());
    assert_eq!(
      after.data.unwrap().total_elements,
      before.data.unwrap().total_elements
    );
  }

  #[tokio::test]
  async fn test_delete_then_refetch_drops_the_row() {
    let (transport, _store, fetcher, coordinator) = setup(
      (1..=8).map(|i| category(i, &format!("Category {i}"))).collect(),
    );
    let family = ResourceFamily::admin_categories();
    let filter = FilterState::new(50);

    let before = fetcher.fetch(&family, &filter).await.unwrap();
    assert_eq!(before.total_elements, 8);
    let reads_before = transport.reads();

    coordinator.delete(&family, 7).await.unwrap();

    // The stale entry forces a refetch rather than serving cached data.
    let after = fetcher.fetch(&family, &filter).await.unwrap();
    assert_eq!(transport.reads(), reads_before + 1);
    assert_eq!(after.total_elements, 7);
    assert!(
      !after
        .content
        .iter()
        .any(|row| row.get("id").and_then(Value::as_i64) == Some(7)),
      "deleted row must not reappear after refetch"
    );
  }

  #[tokio::test]
  async fn test_toggle_reflects_server_state_only() {
    let transport = Arc::new(MemoryTransport::new().with_collection(
      "/api/admin/users",
      vec![
        json!({"id": 7, "name": "Dana", "email": "dana@example.com", "active": true, "roles": ["ROLE_USER"]}),
      ],
    ));
    let store = Arc::new(CacheStore::new());
    let fetcher = Fetcher::new(Arc::clone(&store), Arc::clone(&transport) as Arc<dyn Transport>);
    let coordinator = MutationCoordinator::new(
      Arc::clone(&store),
      Arc::clone(&transport) as Arc<dyn Transport>,
    );
    let family = ResourceFamily::admin_users();
    let filter = FilterState::new(20);

    fetcher.fetch(&family, &filter).await.unwrap();
    let response = coordinator
      .toggle(&family, 7, "toggle-active")
      .await
      .unwrap()
      .unwrap();
    assert_eq!(response.get("active"), Some(&json!(false)));

    // The new value reaches the cache through refetch, not through any
    // local edit of the cached page.
    let page = fetcher.fetch(&family, &filter).await.unwrap();
    assert_eq!(
      page.content[0].get("active"),
      Some(&json!(false))
    );
  }
}
