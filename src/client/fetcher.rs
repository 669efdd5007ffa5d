//! Deduplicated, version-fenced collection reads.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

use crate::cache::{CacheStore, QueryKey};
use crate::error::SyncError;
use crate::filter::FilterState;
use crate::resource::ResourceFamily;

use super::api_types::{reserialize, Page};
use super::Transport;

type SharedFetch = Shared<BoxFuture<'static, Result<Page<Value>, SyncError>>>;

struct InflightFetch {
  id: u64,
  future: SharedFetch,
}

/// Executes collection reads against the cache.
///
/// A fresh cache hit is served directly. Otherwise callers for the same
/// `QueryKey` attach to one shared in-flight request instead of issuing a
/// second one, and the completed response is committed through the store's
/// version fence: a result that lost to a newer invalidation is dropped
/// and replaced by a new fetch.
pub struct Fetcher {
  store: Arc<CacheStore>,
  transport: Arc<dyn Transport>,
  inflight: Mutex<HashMap<String, InflightFetch>>,
  next_fetch_id: AtomicU64,
}

impl Fetcher {
  pub fn new(store: Arc<CacheStore>, transport: Arc<dyn Transport>) -> Self {
    Self {
      store,
      transport,
      inflight: Mutex::new(HashMap::new()),
      next_fetch_id: AtomicU64::new(0),
    }
  }

  pub fn store(&self) -> &Arc<CacheStore> {
    &self.store
  }

  /// Read one page for the filter state.
  pub async fn fetch(
    &self,
    family: &ResourceFamily,
    filter: &FilterState,
  ) -> Result<Page<Value>, SyncError> {
    let key = QueryKey::build(family.name(), filter);
    loop {
      if let Some(entry) = self.store.get(&key) {
        if entry.is_fresh() {
          if let Some(data) = entry.data {
            trace!(key = %key, "cache hit");
            return Ok(data);
          }
        }
      }

      let origin = self.store.begin_fetch(&key);
      let (fetch_id, future) = self.join_or_start(&key, family);
      let result = future.await;
      self.finish(&key, fetch_id);

      match result {
        Ok(page) => {
          if self.store.commit(&key, page.clone(), origin) {
            return Ok(page);
          }
          // The fence moved while we were in flight; the data we need now
          // is for a newer cache state, so go around again.
          debug!(key = %key, "response lost to a newer invalidation, refetching");
        }
        Err(err) => {
          self.store.commit_error(&key, origin);
          return Err(err);
        }
      }
    }
  }

  /// Uncached singleton read, for small administrative snapshots that are
  /// not part of any paginated family.
  pub async fn fetch_value(&self, path: &str) -> Result<Value, SyncError> {
    self.transport.get_json(path, "").await
  }

  /// Read one page and reserialize its rows into a typed record.
  pub async fn fetch_as<T: DeserializeOwned>(
    &self,
    family: &ResourceFamily,
    filter: &FilterState,
  ) -> Result<Page<T>, SyncError> {
    let page = self.fetch(family, filter).await?;
    reserialize(&page).map_err(SyncError::decode)
  }

  fn lock_inflight(&self) -> MutexGuard<'_, HashMap<String, InflightFetch>> {
    self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Attach to the in-flight request for this key, or start one.
  fn join_or_start(&self, key: &QueryKey, family: &ResourceFamily) -> (u64, SharedFetch) {
    let hash = key.hash();
    let mut inflight = self.lock_inflight();
    if let Some(pending) = inflight.get(&hash) {
      trace!(key = %key, "joining in-flight fetch");
      return (pending.id, pending.future.clone());
    }

    let transport = Arc::clone(&self.transport);
    let path = family.collection().to_string();
    let query = key.canonical().to_string();
    let future = async move {
      let value = transport.get_json(&path, &query).await?;
      reserialize::<Page<Value>>(&value).map_err(SyncError::decode)
    }
    .boxed()
    .shared();

    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
    inflight.insert(
      hash,
      InflightFetch {
        id,
        future: future.clone(),
      },
    );
    (id, future)
  }

  /// Retire a completed fetch. Only the request we awaited is removed; a
  /// newer one registered under the same key is left alone.
  fn finish(&self, key: &QueryKey, fetch_id: u64) {
    let hash = key.hash();
    let mut inflight = self.lock_inflight();
    if inflight.get(&hash).map(|p| p.id) == Some(fetch_id) {
      inflight.remove(&hash);
    }
  }
}
