//! `guardian-engine`: the authorization decision engine for a component-based UI.
//!
//! The host framework asks a [`Guardian`] two questions: may this page type
//! be instantiated, and may this component be rendered. Requirements come
//! from the frozen [`ComponentRegistry`], are evaluated by `guardian-auth`
//! against the caller of the current [`RequestCycle`], and instantiation
//! denials become [`NavigationDirective`]s for the host's router.

pub mod config;
pub mod feedback;
pub mod navigation;
pub mod registry;
pub mod request;
pub mod strategy;

pub use config::GuardianConfig;
pub use feedback::{
    BundledMessages, FeedbackChannel, FeedbackLevel, FeedbackMessage, Localizer, SessionFeedback,
    DEFAULT_LOGIN_REQUIRED_MESSAGE, LOGIN_REQUIRED_MESSAGE_KEY,
};
pub use navigation::{classify, Failure, NavigationDirective, NavigationMapper};
pub use registry::{ComponentRegistry, RegistryBuilder, RegistryError, TypeDecl, ACCESS_DENIED_PAGE, LOGIN_PAGE};
pub use request::{PendingDenial, RequestCycle};
pub use strategy::{Guardian, InstallError, UnauthorizedInstantiation};
