//! Component type identity as seen by the host UI framework.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Identifier of a component type (a page, panel, link, ...).
///
/// Type keys replace runtime reflection: the host registers each component type
/// under a key once, and every authorization decision is keyed by it. Page keys
/// double as navigation destinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    /// Key for a statically known type name. Use [`TypeKey::parse`] for
    /// untrusted input.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Validate and build a key from arbitrary input.
    pub fn parse(name: impl Into<Cow<'static, str>>) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::validation("type key must not be blank"));
        }
        if name.trim() != name {
            return Err(CoreError::validation(format!(
                "type key '{name}' has surrounding whitespace"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TypeKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TypeKey> for String {
    fn from(value: TypeKey) -> Self {
        value.0.into_owned()
    }
}

/// Declared classification of a component type.
///
/// Only pages (top-level navigable units) are subject to instantiation checks;
/// everything else is gated at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Page,
    #[default]
    Component,
}

/// An action the host framework asks permission for on a live component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Render,
    Enable,
    /// Host-defined action; never checked by the guardian.
    Named(String),
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Action::Render => f.write_str("RENDER"),
            Action::Enable => f.write_str("ENABLE"),
            Action::Named(name) => f.write_str(name),
        }
    }
}

/// A live component instance, as far as authorization is concerned.
pub trait Component {
    /// The concrete (most-derived) type of this instance.
    fn type_key(&self) -> &TypeKey;
}

impl Component for TypeKey {
    fn type_key(&self) -> &TypeKey {
        self
    }
}
