//! reqwest-backed transport implementation.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tracing::trace;
use url::Url;

use crate::config::ServerConfig;
use crate::error::SyncError;

use super::{Transport, Verb};

/// Transport over a shared reqwest client.
///
/// Carries the session bearer token once sign-in succeeds; everything else
/// (TLS, compression, timeouts) is configured once at construction.
pub struct HttpTransport {
  base: Url,
  client: Client,
  token: RwLock<Option<String>>,
}

impl HttpTransport {
  pub fn new(server: &ServerConfig) -> Result<Self, SyncError> {
    let base = Url::parse(&server.url)
      .map_err(|e| SyncError::Transport(format!("invalid server url {}: {}", server.url, e)))?;
    let client = Client::builder()
      .timeout(Duration::from_secs(server.timeout_secs))
      .build()?;
    Ok(Self {
      base,
      client,
      token: RwLock::new(None),
    })
  }

  /// Attach (or clear) the bearer token sent with every request.
  pub fn set_token(&self, token: Option<String>) {
    *self
      .token
      .write()
      .unwrap_or_else(std::sync::PoisonError::into_inner) = token;
  }

  fn url_for(&self, path: &str, query: &str) -> Result<Url, SyncError> {
    let mut url = self
      .base
      .join(path)
      .map_err(|e| SyncError::Transport(format!("invalid path {}: {}", path, e)))?;
    if !query.is_empty() {
      url.set_query(Some(query));
    }
    Ok(url)
  }

  async fn execute(
    &self,
    method: Method,
    url: Url,
    body: Option<Value>,
  ) -> Result<Option<Value>, SyncError> {
    trace!(%method, %url, "request");
    let mut request = self.client.request(method, url);
    let token = self
      .token
      .read()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .clone();
    if let Some(token) = token {
      request = request.bearer_auth(token);
    }
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(SyncError::Api {
        status: status.as_u16(),
        message,
      });
    }
    if status == StatusCode::NO_CONTENT {
      return Ok(None);
    }
    let text = response.text().await?;
    if text.is_empty() {
      return Ok(None);
    }
    let value = serde_json::from_str(&text).map_err(SyncError::decode)?;
    Ok(Some(value))
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get_json(&self, path: &str, query: &str) -> Result<Value, SyncError> {
    let url = self.url_for(path, query)?;
    self
      .execute(Method::GET, url, None)
      .await?
      .ok_or_else(|| SyncError::Decode("empty response body".to_string()))
  }

  async fn send_json(
    &self,
    verb: Verb,
    path: &str,
    body: Option<Value>,
  ) -> Result<Option<Value>, SyncError> {
    let method = match verb {
      Verb::Post => Method::POST,
      Verb::Put => Method::PUT,
      Verb::Patch => Method::PATCH,
      Verb::Delete => Method::DELETE,
    };
    let url = self.url_for(path, "")?;
    self.execute(method, url, body).await
  }
}
