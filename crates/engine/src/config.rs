//! Installation-time configuration.
//!
//! A `GuardianConfig` is assembled during application startup and handed to
//! [`Guardian::install`](crate::Guardian::install), which takes ownership. The
//! `with_*` setters are for configuration time only; the installed engine
//! never exposes a way to change its configuration.

use serde::{Deserialize, Serialize};

use guardian_core::{CoreError, CoreResult, TypeKey};

use crate::registry::{ACCESS_DENIED_PAGE, LOGIN_PAGE};

pub const LOGIN_PAGE_ENV: &str = "GUARDIAN_LOGIN_PAGE";
pub const UNAUTHORIZED_PAGE_ENV: &str = "GUARDIAN_UNAUTHORIZED_PAGE";

/// Where denied callers are sent.
///
/// `None` disables the corresponding redirect: the denial then surfaces as
/// an unhandled failure through the host's normal error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Destination for callers who need to (re-)authenticate.
    pub login_page: Option<TypeKey>,
    /// Destination for identified callers who lack access.
    pub unauthorized_page: Option<TypeKey>,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            login_page: Some(LOGIN_PAGE),
            unauthorized_page: Some(ACCESS_DENIED_PAGE),
        }
    }
}

impl GuardianConfig {
    pub fn with_login_page(mut self, page: Option<TypeKey>) -> Self {
        self.login_page = page;
        self
    }

    pub fn with_unauthorized_page(mut self, page: Option<TypeKey>) -> Self {
        self.unauthorized_page = page;
        self
    }

    /// Parse a JSON document; absent fields keep their defaults, `null` disables.
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read `GUARDIAN_LOGIN_PAGE` / `GUARDIAN_UNAUTHORIZED_PAGE`.
    ///
    /// Unset variables keep the defaults; an empty value or `none` disables
    /// the destination.
    pub fn from_env() -> CoreResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            login_page: page_from_env(LOGIN_PAGE_ENV, defaults.login_page)?,
            unauthorized_page: page_from_env(UNAUTHORIZED_PAGE_ENV, defaults.unauthorized_page)?,
        })
    }
}

fn page_from_env(name: &str, default: Option<TypeKey>) -> CoreResult<Option<TypeKey>> {
    match std::env::var(name) {
        Ok(value) => parse_page(&value),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(std::env::VarError::NotUnicode(_)) => {
            Err(CoreError::config(format!("{name} is not valid unicode")))
        }
    }
}

fn parse_page(value: &str) -> CoreResult<Option<TypeKey>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    TypeKey::parse(value.to_string()).map(Some)
}
