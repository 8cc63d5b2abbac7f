//! Login and logout links.

use guardian_auth::{Authenticator, Subject};
use guardian_core::{Action, Component, TypeKey};
use guardian_engine::{Guardian, NavigationDirective, RequestCycle};

use crate::{Response, LOGIN_LINK, LOGOUT_LINK};

static LOGIN_LINK_TYPE: TypeKey = LOGIN_LINK;
static LOGOUT_LINK_TYPE: TypeKey = LOGOUT_LINK;

/// Link to the configured login page, visible to guests only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginLink {
    destination: Option<TypeKey>,
}

impl LoginLink {
    /// After login the caller returns to the page the link was clicked on.
    pub fn new() -> Self {
        Self::default()
    }

    /// After login the caller continues at `destination` instead.
    pub fn to(destination: TypeKey) -> Self {
        Self {
            destination: Some(destination),
        }
    }

    /// Clicking intercepts the request with a login redirect. Once the caller
    /// has logged in and the click is replayed, it goes to the destination
    /// (or stays) instead of looping back to the login page.
    pub fn on_click(&self, guardian: &Guardian, cycle: &RequestCycle<'_>) -> Response {
        if !cycle.identity().is_authenticated() {
            let Some(login_page) = guardian.config().login_page.clone() else {
                tracing::warn!(request_id = %cycle.id(), "login link clicked but no login page is configured");
                return Response::Stay;
            };
            return Response::Navigate {
                directive: NavigationDirective::RedirectToLogin {
                    login_page,
                    resume: cycle.target().cloned(),
                },
            };
        }

        match &self.destination {
            Some(page) => Response::Page { page: page.clone() },
            None => Response::Stay,
        }
    }

    /// Whether `page` is where this link leads.
    pub fn links_to(&self, guardian: &Guardian, page: &TypeKey) -> bool {
        guardian.config().login_page.as_ref() == Some(page)
    }
}

impl Component for LoginLink {
    fn type_key(&self) -> &TypeKey {
        &LOGIN_LINK_TYPE
    }
}

/// Logs the caller out; visible to known users only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutLink {
    destination: Option<TypeKey>,
}

impl LogoutLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(destination: TypeKey) -> Self {
        Self {
            destination: Some(destination),
        }
    }

    /// Log out, then go to the destination if one was given. Otherwise stay
    /// on the current page unless an anonymous caller may no longer render
    /// it, in which case go home.
    pub fn on_click(&self, guardian: &Guardian, cycle: &RequestCycle<'_>, authenticator: &dyn Authenticator) -> Response {
        authenticator.logout();
        tracing::debug!(request_id = %cycle.id(), "caller logged out");

        if let Some(page) = &self.destination {
            return Response::Page { page: page.clone() };
        }

        let Some(current) = cycle.target() else {
            return Response::Stay;
        };
        let anonymous = Subject::anonymous();
        let after_logout = RequestCycle::new(&anonymous, cycle.feedback());
        if guardian.can_perform_action(&after_logout, current, &Action::Render) {
            Response::Stay
        } else {
            Response::Home
        }
    }
}

impl Component for LogoutLink {
    fn type_key(&self) -> &TypeKey {
        &LOGOUT_LINK_TYPE
    }
}
