//! The login form and the gate in front of the login page.

use guardian_auth::{AuthenticationError, Authenticator, Credentials};
use guardian_core::{Component, TypeKey};
use guardian_engine::{FeedbackMessage, RequestCycle, LOGIN_PAGE};

use crate::Response;

static LOGIN_PAGE_TYPE: TypeKey = LOGIN_PAGE;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username and/or password.";

/// Reporter id of feedback attached to the username field.
pub const USERNAME_FIELD: &str = "username";

/// Username/password form backed by an [`Authenticator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginForm {
    remember_me: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the authenticator to remember the identity beyond this session.
    pub fn remember_me(mut self, remember: bool) -> Self {
        self.remember_me = remember;
        self
    }

    /// Attempt a login with `credentials`, which are consumed either way.
    ///
    /// On success the caller continues at `original_destination`, or at the
    /// home page when there is none. On failure the form stays and an error
    /// is attached to the username field.
    pub fn submit(
        &self,
        cycle: &RequestCycle<'_>,
        authenticator: &dyn Authenticator,
        credentials: Credentials,
        original_destination: Option<&TypeKey>,
    ) -> Response {
        if credentials.username.trim().is_empty() {
            cycle
                .feedback()
                .report(FeedbackMessage::error("Field 'username' is required.").reported_by(USERNAME_FIELD));
            return Response::Stay;
        }

        match authenticator.login(credentials, self.remember_me) {
            Ok(principal) => {
                tracing::info!(request_id = %cycle.id(), principal = %principal.id, "login succeeded");
                match original_destination {
                    Some(page) => Response::Page { page: page.clone() },
                    None => Response::Home,
                }
            }
            Err(err) => {
                match &err {
                    AuthenticationError::InvalidCredentials => {
                        tracing::debug!(request_id = %cycle.id(), "login rejected")
                    }
                    AuthenticationError::Unavailable(_) => {
                        tracing::warn!(request_id = %cycle.id(), error = %err, "login failed")
                    }
                }
                cycle
                    .feedback()
                    .report(FeedbackMessage::error(INVALID_CREDENTIALS_MESSAGE).reported_by(USERNAME_FIELD));
                Response::Stay
            }
        }
    }
}

/// The bundled login page: skipped entirely for a freshly authenticated caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginPage;

impl LoginPage {
    pub fn before_render(&self, cycle: &RequestCycle<'_>) -> Response {
        if cycle.identity().is_authenticated() {
            Response::Home
        } else {
            Response::Stay
        }
    }
}

impl Component for LoginPage {
    fn type_key(&self) -> &TypeKey {
        &LOGIN_PAGE_TYPE
    }
}
