//! Who the current caller is, and how sure we are about it.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{IdentityProvider, Permission, Role};

/// Stable identity of a principal (human user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// An identified principal: stable id plus the name shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
}

impl Principal {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: PrincipalId::new(),
            name: name.into(),
        }
    }
}

/// How an identity was established for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Freshness {
    /// Restored from a long-lived token without a credential check this session.
    Remembered,
    /// Explicitly verified with credentials during this session.
    Authenticated { at: DateTime<Utc> },
}

/// Point-in-time snapshot of the current caller.
///
/// `Subject` is the in-process [`IdentityProvider`] the guardian ships with;
/// hosts backed by an external security framework implement the trait on
/// their own handle instead.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subject {
    identity: Option<(Principal, Freshness)>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
}

impl Subject {
    /// A caller with no identity at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A caller who presented credentials in this session.
    pub fn authenticated(principal: Principal, at: DateTime<Utc>) -> Self {
        Self {
            identity: Some((principal, Freshness::Authenticated { at })),
            ..Self::default()
        }
    }

    /// A caller restored from a "remember me" token.
    pub fn remembered(principal: Principal) -> Self {
        Self {
            identity: Some((principal, Freshness::Remembered)),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        self.roles.push(Role::new(role));
        self
    }

    pub fn with_permission(mut self, permission: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        self.permissions.push(Permission::new(permission));
        self
    }

    pub fn freshness(&self) -> Option<Freshness> {
        self.identity.as_ref().map(|(_, freshness)| *freshness)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

impl IdentityProvider for Subject {
    fn principal(&self) -> Option<&Principal> {
        self.identity.as_ref().map(|(principal, _)| principal)
    }

    fn is_authenticated(&self) -> bool {
        matches!(self.freshness(), Some(Freshness::Authenticated { .. }))
    }

    fn is_remembered(&self) -> bool {
        matches!(self.freshness(), Some(Freshness::Remembered))
    }

    fn has_role(&self, role: &Role) -> bool {
        self.principal().is_some() && self.roles.contains(role)
    }

    fn is_permitted(&self, permission: &Permission) -> bool {
        self.principal().is_some() && self.permissions.iter().any(|held| held.implies(permission))
    }
}
