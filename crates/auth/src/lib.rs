//! `guardian-auth`: requirement model and evaluator.
//!
//! Pure policy: no IO, no request state, no navigation. Whether the caller
//! holds something is always delegated to an [`IdentityProvider`].

pub mod authorize;
pub mod denial;
pub mod grants;
pub mod principal;
pub mod provider;
pub mod requirement;

pub use authorize::{
    assert_satisfied, check, explain_authorization, require_permission, require_role,
    AuthorizationExplanation,
};
pub use denial::{Classification, DenialCause, DenialReason};
pub use grants::{Permission, Role};
pub use principal::{Freshness, Principal, PrincipalId, Subject};
pub use provider::{AuthenticationError, Authenticator, Credentials, IdentityProvider};
pub use requirement::{Logical, Requirement, RequirementKind, RequirementSet};
