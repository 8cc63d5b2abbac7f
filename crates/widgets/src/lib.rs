//! `guardian-widgets`: headless login/logout building blocks.
//!
//! Nothing here renders. Each widget turns a user interaction into a
//! [`Response`] for the host to carry out, and asks the installed
//! [`guardian_engine::Guardian`] whenever visibility matters.

pub mod links;
pub mod login;
pub mod status;

use serde::Serialize;

use guardian_auth::Requirement;
use guardian_core::TypeKey;
use guardian_engine::{NavigationDirective, RegistryBuilder, TypeDecl};

pub use links::{LoginLink, LogoutLink};
pub use login::{LoginForm, LoginPage, INVALID_CREDENTIALS_MESSAGE, USERNAME_FIELD};
pub use status::{AuthenticationStatus, AuthenticationStatusPanel};

pub const LOGIN_LINK: TypeKey = TypeKey::from_static("LoginLink");
pub const LOGOUT_LINK: TypeKey = TypeKey::from_static("LogoutLink");
pub const AUTHENTICATION_STATUS_PANEL: TypeKey = TypeKey::from_static("AuthenticationStatusPanel");

/// What the host should do after a widget handled an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    /// Re-render the current page.
    Stay,
    /// Go to the given page.
    Page { page: TypeKey },
    /// Go to the application's home page.
    Home,
    /// Intercept the request; see [`NavigationDirective`].
    Navigate { directive: NavigationDirective },
}

/// Declare the widget types and their requirements.
///
/// The bundled pages are declared by [`RegistryBuilder::with_default_pages`].
pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(TypeDecl::component(LOGIN_LINK).requires(Requirement::Guest))
        .register(TypeDecl::component(LOGOUT_LINK).requires(Requirement::User))
        .register(TypeDecl::component(AUTHENTICATION_STATUS_PANEL))
}
