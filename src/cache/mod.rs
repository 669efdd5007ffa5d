//! Version-fenced query cache.
//!
//! This module provides the resource-agnostic caching core:
//! - Canonical, order-independent cache identities derived from filter state
//! - Per-key entries with data, status, and a monotonically increasing
//!   version used to refuse responses that lost a race
//! - Family-wide invalidation with stale-while-revalidate semantics
//! - Channel-based subscriptions notified on every version bump

mod key;
mod store;

pub use key::QueryKey;
pub use store::{CacheEntry, CacheEvent, CacheStore, FetchStatus};
