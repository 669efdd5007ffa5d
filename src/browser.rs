//! The list-view consumer: committed state, draft edits, history.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::{CacheEvent, QueryKey};
use crate::client::api_types::Page;
use crate::client::fetcher::Fetcher;
use crate::error::SyncError;
use crate::filter::FilterState;
use crate::history::{History, Location};
use crate::resource::ResourceFamily;
use crate::urlstate::UrlStateBinder;

/// A browsing session over one resource family.
///
/// The committed filter state lives in the address (via the binder); the
/// browser itself only buffers uncommitted draft edits. Typing into a
/// filter field buffers locally and causes no traffic; `commit` promotes
/// the draft to the address (resetting the page if any filter changed)
/// and loads the result. History navigation re-derives state from the
/// address and is never treated as an edit.
pub struct ResourceBrowser {
  family: ResourceFamily,
  binder: UrlStateBinder,
  history: History,
  fetcher: Arc<Fetcher>,
  draft: BTreeMap<String, String>,
}

impl ResourceBrowser {
  pub fn new(family: ResourceFamily, fetcher: Arc<Fetcher>) -> Self {
    let binder = UrlStateBinder::for_family(&family);
    let initial = FilterState::new(family.default_size());
    let location = Location::with_query(family.collection(), &initial.canonical_query());
    Self {
      family,
      binder,
      history: History::new(location),
      fetcher,
      draft: BTreeMap::new(),
    }
  }

  /// Start from an existing address, e.g. a shared or reloaded link.
  pub fn at_location(family: ResourceFamily, fetcher: Arc<Fetcher>, location: Location) -> Self {
    let binder = UrlStateBinder::for_family(&family);
    Self {
      family,
      binder,
      history: History::new(location),
      fetcher,
      draft: BTreeMap::new(),
    }
  }

  pub fn family(&self) -> &ResourceFamily {
    &self.family
  }

  pub fn location(&self) -> &Location {
    self.history.current()
  }

  /// The committed filter state, decoded from the current address.
  pub fn filter(&self) -> FilterState {
    self.binder.read(self.history.current())
  }

  pub fn query_key(&self) -> QueryKey {
    QueryKey::build(self.family.name(), &self.filter())
  }

  /// Buffer a filter edit without applying it.
  pub fn edit(&mut self, name: &str, value: &str) {
    self.draft.insert(name.to_string(), value.to_string());
  }

  pub fn has_pending_edits(&self) -> bool {
    !self.draft.is_empty()
  }

  /// Promote buffered edits to the committed state and load the result.
  /// Any filter change returns the view to page 0.
  pub async fn commit(&mut self) -> Result<Page<Value>, SyncError> {
    let mut next = self.filter();
    for (name, value) in std::mem::take(&mut self.draft) {
      next = next.with_field(&name, &value);
    }
    self.binder.write(&mut self.history, &next);
    self.load().await
  }

  /// Move to another page of the same result set.
  pub async fn goto_page(&mut self, page: u32) -> Result<Page<Value>, SyncError> {
    let next = self.filter().with_page(page);
    self.binder.write(&mut self.history, &next);
    self.load().await
  }

  /// History navigation; returns `None` at the end of the stack.
  pub async fn back(&mut self) -> Option<Result<Page<Value>, SyncError>> {
    if !self.history.back() {
      return None;
    }
    Some(self.load().await)
  }

  pub async fn forward(&mut self) -> Option<Result<Page<Value>, SyncError>> {
    if !self.history.forward() {
      return None;
    }
    Some(self.load().await)
  }

  /// Fetch the page for the committed state (cache-aware).
  pub async fn load(&self) -> Result<Page<Value>, SyncError> {
    self.fetcher.fetch(&self.family, &self.filter()).await
  }

  /// Fetch and reserialize into a typed record.
  pub async fn load_as<T: DeserializeOwned>(&self) -> Result<Page<T>, SyncError> {
    self.fetcher.fetch_as(&self.family, &self.filter()).await
  }

  /// Subscribe to cache updates for the current key. The rendering layer
  /// subscribes around its own lifecycle and drops the receiver to stop.
  pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CacheEvent> {
    self.fetcher.store().subscribe(&self.query_key())
  }
}
