//! Seams to the external identity/authorization provider.
//!
//! The guardian never stores identity; it only asks these traits.

use thiserror::Error;

use crate::{Permission, Principal, Role};

/// Read-only view of the current caller, answered by the host's security layer.
///
/// Implementations must be cheap and synchronous: they are consulted on every
/// instantiation and render check.
pub trait IdentityProvider {
    /// The identified principal, if any (fresh or remembered).
    fn principal(&self) -> Option<&Principal>;

    /// Identity was verified with credentials during this session.
    fn is_authenticated(&self) -> bool;

    /// Identity was restored from a long-lived token.
    fn is_remembered(&self) -> bool;

    /// Any identity at all, fresh or remembered.
    fn is_known(&self) -> bool {
        self.is_authenticated() || self.is_remembered()
    }

    fn has_role(&self, role: &Role) -> bool;

    fn is_permitted(&self, permission: &Permission) -> bool;
}

/// Username/password pair submitted by a login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("invalid username and/or password")]
    InvalidCredentials,

    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),
}

/// Session-changing side of the security layer, used by login/logout widgets.
///
/// Methods take `&self`; implementations own whatever session state they mutate.
pub trait Authenticator {
    /// Verify credentials and establish a fresh identity (optionally remembered).
    fn login(&self, credentials: Credentials, remember: bool) -> Result<Principal, AuthenticationError>;

    /// Drop the current identity and invalidate the session.
    fn logout(&self);
}
