//! HTTP client layer: the transport seam, the reqwest implementation, and
//! the read/write coordinators built on top of it.

pub mod api_types;
pub mod fetcher;
pub mod http;
pub mod mutation;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SyncError;

/// HTTP verb for a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
  Post,
  Put,
  Patch,
  Delete,
}

/// Seam between the sync layer and the wire.
///
/// Retry policy, TLS, and header mechanics live behind this trait; the
/// sync layer only sees logical requests and the error taxonomy.
#[async_trait]
pub trait Transport: Send + Sync {
  /// Collection read: `GET path?query`.
  async fn get_json(&self, path: &str, query: &str) -> Result<Value, SyncError>;

  /// Write against a path, returning the response body if the server sent
  /// one. The path may carry its own query component.
  async fn send_json(
    &self,
    verb: Verb,
    path: &str,
    body: Option<Value>,
  ) -> Result<Option<Value>, SyncError>;
}
