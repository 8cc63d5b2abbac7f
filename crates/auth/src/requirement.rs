//! Declarative access requirements attached to component types.

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// How multiple values inside one permission/role requirement combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Logical {
    /// Every listed value must be held.
    #[default]
    And,
    /// At least one listed value must be held.
    Or,
}

/// A single access-control predicate declared on a component type.
///
/// Requirements are immutable values; several requirements on one type (or
/// along its ancestry) combine with logical AND.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Caller must be freshly authenticated (a remembered identity is not enough).
    Authentication,
    /// Caller must be known: authenticated or remembered.
    User,
    /// Caller must not be known at all.
    Guest,
    Permissions {
        permissions: Vec<Permission>,
        #[serde(default)]
        logical: Logical,
    },
    Roles {
        roles: Vec<Role>,
        #[serde(default)]
        logical: Logical,
    },
}

/// Discriminant of a [`Requirement`], carried by denials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Authentication,
    User,
    Guest,
    Permission,
    Role,
}

impl Requirement {
    pub fn permission(permission: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        Self::Permissions {
            permissions: vec![Permission::new(permission)],
            logical: Logical::And,
        }
    }

    pub fn permissions<I>(permissions: I, logical: Logical) -> Self
    where
        I: IntoIterator<Item = Permission>,
    {
        Self::Permissions {
            permissions: permissions.into_iter().collect(),
            logical,
        }
    }

    pub fn role(role: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        Self::Roles {
            roles: vec![Role::new(role)],
            logical: Logical::And,
        }
    }

    pub fn roles<I>(roles: I, logical: Logical) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self::Roles {
            roles: roles.into_iter().collect(),
            logical,
        }
    }

    pub fn kind(&self) -> RequirementKind {
        match self {
            Requirement::Authentication => RequirementKind::Authentication,
            Requirement::User => RequirementKind::User,
            Requirement::Guest => RequirementKind::Guest,
            Requirement::Permissions { .. } => RequirementKind::Permission,
            Requirement::Roles { .. } => RequirementKind::Role,
        }
    }
}

/// Ordered, de-duplicated union of requirements collected along a type's ancestry.
///
/// Order is first occurrence, most-derived type first. It never changes the
/// AND result, but it decides which denial is reported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Requirement>", into = "Vec<Requirement>")]
pub struct RequirementSet(Vec<Requirement>);

impl RequirementSet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append `requirement` unless an equal one is already present.
    ///
    /// Returns `true` if it was added.
    pub fn insert(&mut self, requirement: Requirement) -> bool {
        if self.0.contains(&requirement) {
            return false;
        }
        self.0.push(requirement);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Requirement> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Requirement] {
        &self.0
    }
}

impl Extend<Requirement> for RequirementSet {
    fn extend<T: IntoIterator<Item = Requirement>>(&mut self, iter: T) {
        for requirement in iter {
            self.insert(requirement);
        }
    }
}

impl FromIterator<Requirement> for RequirementSet {
    fn from_iter<T: IntoIterator<Item = Requirement>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<Requirement>> for RequirementSet {
    fn from(value: Vec<Requirement>) -> Self {
        value.into_iter().collect()
    }
}

impl From<RequirementSet> for Vec<Requirement> {
    fn from(value: RequirementSet) -> Self {
        value.0
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = core::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
