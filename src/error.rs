//! Error types shared across the sync layer.

use thiserror::Error;

/// Errors surfaced by the sync layer.
///
/// Key derivation and address decoding never fail (malformed input is
/// corrected to defaults), so every variant here originates at the network
/// boundary. Variants are cheap to clone because in-flight deduplication
/// fans one result out to several callers.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
  /// Connection-level failure: DNS, refused, timed out.
  #[error("transport error: {0}")]
  Transport(String),

  /// The server answered with a non-success status.
  #[error("server returned {status}: {message}")]
  Api { status: u16, message: String },

  /// Sign-in rejected. Distinct from `Api` so callers can leave the
  /// current view untouched without inspecting status codes.
  #[error("invalid credentials")]
  Auth,

  /// Response body did not match the expected shape.
  #[error("malformed response: {0}")]
  Decode(String),
}

impl SyncError {
  pub fn decode(err: impl std::fmt::Display) -> Self {
    Self::Decode(err.to_string())
  }

  /// True when the failure happened on the wire rather than in the server.
  pub fn is_transport(&self) -> bool {
    matches!(self, Self::Transport(_))
  }
}

impl From<reqwest::Error> for SyncError {
  fn from(err: reqwest::Error) -> Self {
    Self::Transport(err.to_string())
  }
}
