//! Sign-in, registration, and the authenticated identity.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::client::api_types::reserialize;
use crate::client::{Transport, Verb};
use crate::error::SyncError;
use crate::routing;

fn default_true() -> bool {
  true
}

/// Authenticated user identity as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
  #[serde(default)]
  pub id: i64,
  pub name: String,
  pub email: String,
  #[serde(default = "default_true")]
  pub active: bool,
  /// Role tags; older servers report them under `roleNames`.
  #[serde(default, alias = "roleNames")]
  pub roles: Vec<String>,
}

impl Identity {
  pub fn has_role(&self, role: &str) -> bool {
    self.roles.iter().any(|r| r == role)
  }

  /// Where to send this user immediately after sign-in.
  pub fn destination(&self) -> &'static str {
    routing::route(self.roles.iter().map(String::as_str))
  }
}

/// A signed-in session: identity plus the bearer token it carries.
#[derive(Debug, Clone)]
pub struct AuthSession {
  pub token: String,
  pub user: Identity,
}

#[derive(Debug, Clone, Deserialize)]
struct WireAuthResponse {
  token: String,
  user: Identity,
}

/// Role hint attached to a sign-in or registration request.
///
/// The hint only selects the endpoint; the destination after sign-in is
/// always computed from the roles the server actually returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleHint {
  #[default]
  Auto,
  Admin,
  Provider,
}

impl RoleHint {
  fn login_path(self) -> &'static str {
    match self {
      RoleHint::Auto => "/api/auth/login",
      RoleHint::Admin => "/api/auth/admin/login",
      RoleHint::Provider => "/api/auth/provider/login",
    }
  }
}

impl std::str::FromStr for RoleHint {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "auto" | "" => Ok(RoleHint::Auto),
      "admin" => Ok(RoleHint::Admin),
      "provider" => Ok(RoleHint::Provider),
      other => Err(format!("unknown role hint: {other}")),
    }
  }
}

/// Registration payload. The server takes these as query parameters.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
  pub name: String,
  pub email: String,
  pub username: String,
  pub password: String,
  pub role: Option<String>,
}

/// Client for the authentication endpoints.
///
/// Sign-in never touches cached resource state: on failure the caller
/// stays on the current view with the cache exactly as it was.
pub struct AuthClient {
  transport: Arc<dyn Transport>,
}

impl AuthClient {
  pub fn new(transport: Arc<dyn Transport>) -> Self {
    Self { transport }
  }

  pub async fn sign_in(
    &self,
    identifier: &str,
    password: &str,
    hint: RoleHint,
  ) -> Result<AuthSession, SyncError> {
    let body = json!({ "identifier": identifier, "password": password });
    let response = self
      .transport
      .send_json(Verb::Post, hint.login_path(), Some(body))
      .await
      .map_err(|err| match err {
        SyncError::Api {
          status: 401 | 403, ..
        } => SyncError::Auth,
        other => other,
      })?;

    let value = response.ok_or_else(|| SyncError::Decode("empty auth response".to_string()))?;
    let parsed: WireAuthResponse = reserialize(&value).map_err(SyncError::decode)?;
    info!(user = %parsed.user.email, "signed in");
    Ok(AuthSession {
      token: parsed.token,
      user: parsed.user,
    })
  }

  pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, SyncError> {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("name", &request.name);
    query.append_pair("email", &request.email);
    query.append_pair("username", &request.username);
    query.append_pair("password", &request.password);
    if let Some(role) = &request.role {
      query.append_pair("role", role);
    }
    let path = format!("/api/auth/register?{}", query.finish());

    let response = self.transport.send_json(Verb::Post, &path, None).await?;
    let value = response.ok_or_else(|| SyncError::Decode("empty auth response".to_string()))?;
    let parsed: WireAuthResponse = reserialize(&value).map_err(SyncError::decode)?;
    Ok(AuthSession {
      token: parsed.token,
      user: parsed.user,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheStore, QueryKey};
  use crate::client::fetcher::Fetcher;
  use crate::client::testutil::MemoryTransport;
  use crate::filter::FilterState;
  use crate::resource::ResourceFamily;

  #[tokio::test]
  async fn test_sign_in_returns_identity_with_roles() {
    let transport = Arc::new(
      MemoryTransport::new().with_user("ada", "hunter2", &["ROLE_PROVIDER", "ROLE_USER"]),
    );
    let auth = AuthClient::new(transport);

    let session = auth.sign_in("ada", "hunter2", RoleHint::Auto).await.unwrap();
    assert_eq!(session.token, "test-token");
    assert!(session.user.has_role("ROLE_PROVIDER"));
    assert_eq!(session.user.destination(), crate::routing::PROVIDER_DASHBOARD);
  }

  #[tokio::test]
  async fn test_bad_credentials_are_an_auth_error() {
    let transport = Arc::new(MemoryTransport::new().with_user("ada", "hunter2", &["ROLE_USER"]));
    let auth = AuthClient::new(transport);

    let err = auth.sign_in("ada", "wrong", RoleHint::Auto).await.unwrap_err();
    assert!(matches!(err, SyncError::Auth));
  }

  #[tokio::test]
  async fn test_auth_failure_leaves_cache_untouched() {
    let transport = Arc::new(
      MemoryTransport::new()
        .with_user("ada", "hunter2", &["ROLE_USER"])
        .with_collection(
          "/api/listings",
          vec![serde_json::json!({"id": 1, "title": "Drain cleaning", "price": 80.0})],
        ),
    );
    let store = Arc::new(CacheStore::new());
    let fetcher = Fetcher::new(Arc::clone(&store), Arc::clone(&transport) as Arc<dyn Transport>);
    let family = ResourceFamily::listings();
    let filter = FilterState::new(12);
    fetcher.fetch(&family, &filter).await.unwrap();

    let key = QueryKey::build(family.name(), &filter);
    let before = store.get(&key).unwrap().version;

    let auth = AuthClient::new(Arc::clone(&transport) as Arc<dyn Transport>);
    auth
      .sign_in("ada", "wrong", RoleHint::Auto)
      .await
      .unwrap_err();

    let after = store.get(&key).unwrap();
    assert_eq!(after.version, before);
    assert!(after.is_fresh());
  }

  #[tokio::test]
  async fn test_register_creates_a_session() {
    let transport = Arc::new(MemoryTransport::new());
    let auth = AuthClient::new(transport);

    let session = auth
      .register(&RegisterRequest {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        username: "ada".to_string(),
        password: "hunter2".to_string(),
        role: Some("provider".to_string()),
      })
      .await
      .unwrap();
    assert!(session.user.has_role("ROLE_PROVIDER"));
    assert_eq!(session.user.destination(), crate::routing::PROVIDER_DASHBOARD);
  }

  #[test]
  fn test_identity_destination_uses_precedence() {
    let identity = Identity {
      id: 1,
      name: "Ada".to_string(),
      email: "ada@example.com".to_string(),
      active: true,
      roles: vec!["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()],
    };
    assert_eq!(identity.destination(), crate::routing::ADMIN_HOME);
  }
}
