//! Post-authentication routing.

/// Role tags issued by the server.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_PROVIDER: &str = "ROLE_PROVIDER";
pub const ROLE_USER: &str = "ROLE_USER";

/// Navigation destinations.
pub const ADMIN_HOME: &str = "/admin";
pub const PROVIDER_DASHBOARD: &str = "/dashboard";
pub const BOOKINGS_VIEW: &str = "/bookings";
pub const DEFAULT_LANDING: &str = "/";

/// Compute the destination to send a signed-in user to.
///
/// Precedence is fixed: admin beats provider beats user. Only membership
/// is inspected, so iteration order of the input never matters, and an
/// empty or unrecognized role set lands on the default path rather than
/// failing.
pub fn route<'a, I>(roles: I) -> &'static str
where
  I: IntoIterator<Item = &'a str>,
{
  let mut admin = false;
  let mut provider = false;
  let mut user = false;
  for role in roles {
    match role {
      ROLE_ADMIN => admin = true,
      ROLE_PROVIDER => provider = true,
      ROLE_USER => user = true,
      _ => {}
    }
  }

  if admin {
    ADMIN_HOME
  } else if provider {
    PROVIDER_DASHBOARD
  } else if user {
    BOOKINGS_VIEW
  } else {
    DEFAULT_LANDING
  }
}
