//! Version-fenced store of paginated query results.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::client::api_types::Page;

use super::key::QueryKey;

/// Fetch lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
  Idle,
  Loading,
  Success,
  Error,
}

/// One cached query result plus the metadata the version fence needs.
///
/// `version` moves on every invalidation and every committed fetch result;
/// a response whose originating version no longer matches is refused.
/// `stale` entries keep their data so a view can render the old page while
/// the refetch runs.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub data: Option<Page<Value>>,
  pub status: FetchStatus,
  pub version: u64,
  pub stale: bool,
  pub fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
  fn new() -> Self {
    Self {
      data: None,
      status: FetchStatus::Idle,
      version: 0,
      stale: false,
      fetched_at: None,
    }
  }

  /// Fresh entries can be served without a refetch.
  pub fn is_fresh(&self) -> bool {
    self.status == FetchStatus::Success && !self.stale
  }
}

/// Delivered to subscribers on every version bump for their key.
#[derive(Debug, Clone)]
pub struct CacheEvent {
  pub key: QueryKey,
  pub version: u64,
  pub status: FetchStatus,
}

struct Inner {
  entries: HashMap<QueryKey, CacheEntry>,
  subscribers: HashMap<QueryKey, Vec<mpsc::UnboundedSender<CacheEvent>>>,
}

/// Shared cache of query results, one per application session.
///
/// Constructed explicitly and passed by `Arc` into the fetcher and the
/// mutation coordinator; there is no hidden process-wide singleton. The
/// version counter on each entry is the sole concurrency-control
/// primitive: writes that lost the race are refused deterministically,
/// whatever order their responses arrive in.
pub struct CacheStore {
  inner: Mutex<Inner>,
}

impl CacheStore {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        entries: HashMap::new(),
        subscribers: HashMap::new(),
      }),
    }
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
    self.lock().entries.get(key).cloned()
  }

  /// Mark the entry loading and return the originating version for the
  /// fence check at commit time. Existing data is retained so the old
  /// page keeps rendering while the fetch runs.
  pub fn begin_fetch(&self, key: &QueryKey) -> u64 {
    let mut inner = self.lock();
    let entry = inner
      .entries
      .entry(key.clone())
      .or_insert_with(CacheEntry::new);
    entry.status = FetchStatus::Loading;
    entry.version
  }

  /// Commit a successful response. Refused when the entry's version moved
  /// since `origin_version` was taken: a newer invalidation or commit
  /// wins regardless of arrival order.
  pub fn commit(&self, key: &QueryKey, page: Page<Value>, origin_version: u64) -> bool {
    let mut inner = self.lock();
    let entry = inner
      .entries
      .entry(key.clone())
      .or_insert_with(CacheEntry::new);
    if entry.version != origin_version {
      trace!(key = %key, origin_version, current = entry.version, "stale response refused");
      return false;
    }
    entry.data = Some(page);
    entry.status = FetchStatus::Success;
    entry.stale = false;
    entry.version += 1;
    entry.fetched_at = Some(Utc::now());
    Self::notify(&mut inner, key);
    true
  }

  /// Record a failed fetch behind the same fence. Prior data is retained.
  pub fn commit_error(&self, key: &QueryKey, origin_version: u64) -> bool {
    let mut inner = self.lock();
    let entry = inner
      .entries
      .entry(key.clone())
      .or_insert_with(CacheEntry::new);
    if entry.version != origin_version {
      return false;
    }
    entry.status = FetchStatus::Error;
    entry.version += 1;
    Self::notify(&mut inner, key);
    true
  }

  /// Mark every entry of the family stale, bumping its version so any
  /// in-flight response for the old state is refused. Data is retained
  /// for stale-while-revalidate rendering.
  pub fn invalidate(&self, family: &str) {
    let mut inner = self.lock();
    let keys: Vec<QueryKey> = inner
      .entries
      .keys()
      .filter(|k| k.family() == family)
      .cloned()
      .collect();
    for key in &keys {
      if let Some(entry) = inner.entries.get_mut(key) {
        entry.stale = true;
        entry.version += 1;
      }
      Self::notify(&mut inner, key);
    }
    debug!(family, invalidated = keys.len(), "cache invalidated");
  }

  /// Subscribe to version bumps for one key. The receiver sees an event
  /// for every commit, error, and invalidation; dropping it unsubscribes.
  pub fn subscribe(&self, key: &QueryKey) -> mpsc::UnboundedReceiver<CacheEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    self
      .lock()
      .subscribers
      .entry(key.clone())
      .or_default()
      .push(tx);
    rx
  }

  /// Process-wide reset: drop all entries and close all subscriptions.
  /// Not required for correctness, but bounds memory in long sessions.
  pub fn reset(&self) {
    let mut inner = self.lock();
    inner.entries.clear();
    inner.subscribers.clear();
  }

  fn notify(inner: &mut Inner, key: &QueryKey) {
    let Some(entry) = inner.entries.get(key) else {
      return;
    };
    let event = CacheEvent {
      key: key.clone(),
      version: entry.version,
      status: entry.status,
    };
    if let Some(subscribers) = inner.subscribers.get_mut(key) {
      subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
  }
}

impl Default for CacheStore {
  fn default() -> Self {
    Self::new()
  }
}
