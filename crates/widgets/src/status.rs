//! Who is logged in, and which of the login/logout links to show.

use serde::Serialize;

use guardian_core::{Action, Component, TypeKey};
use guardian_engine::{Guardian, RequestCycle};

use crate::links::{LoginLink, LogoutLink};
use crate::AUTHENTICATION_STATUS_PANEL;

static PANEL_TYPE: TypeKey = AUTHENTICATION_STATUS_PANEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationStatus {
    /// Display name of the current principal; `None` for an unknown caller.
    pub username: Option<String>,
    pub login_link_visible: bool,
    pub logout_link_visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticationStatusPanel {
    login: LoginLink,
    logout: LogoutLink,
}

impl AuthenticationStatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(login: LoginLink, logout: LogoutLink) -> Self {
        Self { login, logout }
    }

    pub fn login_link(&self) -> &LoginLink {
        &self.login
    }

    pub fn logout_link(&self) -> &LogoutLink {
        &self.logout
    }

    pub fn status(&self, guardian: &Guardian, cycle: &RequestCycle<'_>) -> AuthenticationStatus {
        AuthenticationStatus {
            username: cycle.identity().principal().map(|p| p.name.clone()),
            login_link_visible: guardian.can_perform_action(cycle, &self.login, &Action::Render),
            logout_link_visible: guardian.can_perform_action(cycle, &self.logout, &Action::Render),
        }
    }
}

impl Component for AuthenticationStatusPanel {
    fn type_key(&self) -> &TypeKey {
        &PANEL_TYPE
    }
}
