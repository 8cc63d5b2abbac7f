//! Denial taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RequirementKind;

/// Why a caller was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No identity, or only a remembered one where a fresh login is required.
    Unauthenticated,
    /// Identified, but missing a permission or role.
    Unauthorized,
    /// Identified, while the resource is reserved for guests.
    GuestViolation,
}

/// The two navigation-relevant outcomes every denial resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    NeedsAuthentication,
    NeedsElevatedAccess,
}

impl DenialReason {
    pub fn classification(self) -> Classification {
        match self {
            DenialReason::Unauthenticated => Classification::NeedsAuthentication,
            DenialReason::Unauthorized | DenialReason::GuestViolation => {
                Classification::NeedsElevatedAccess
            }
        }
    }
}

/// A failed authorization check.
///
/// Produced by the evaluator for declared requirements, and by backend code
/// that performs its own checks (`origin` is then `None`). It is an `Error`
/// so backend failures can travel through `?` and `anyhow` until the
/// navigation mapper picks them up.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct DenialCause {
    reason: DenialReason,
    origin: Option<RequirementKind>,
    message: String,
}

impl DenialCause {
    pub fn new(reason: DenialReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            origin: None,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(DenialReason::Unauthenticated, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(DenialReason::Unauthorized, message)
    }

    pub fn guest_violation(message: impl Into<String>) -> Self {
        Self::new(DenialReason::GuestViolation, message)
    }

    /// Record which kind of declared requirement produced this denial.
    pub fn with_origin(mut self, origin: RequirementKind) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn reason(&self) -> DenialReason {
        self.reason
    }

    pub fn origin(&self) -> Option<RequirementKind> {
        self.origin
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn classification(&self) -> Classification {
        self.reason.classification()
    }

    pub fn needs_authentication(&self) -> bool {
        self.classification() == Classification::NeedsAuthentication
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_reason() -> impl Strategy<Value = DenialReason> {
        prop_oneof![
            Just(DenialReason::Unauthenticated),
            Just(DenialReason::Unauthorized),
            Just(DenialReason::GuestViolation),
        ]
    }

    #[test]
    fn guest_violation_is_not_an_authentication_problem() {
        let cause = DenialCause::guest_violation("already logged in")
            .with_origin(RequirementKind::Guest);
        assert_eq!(cause.classification(), Classification::NeedsElevatedAccess);
        assert!(!cause.needs_authentication());
        assert_eq!(cause.origin(), Some(RequirementKind::Guest));
    }

    #[test]
    fn displays_message() {
        let cause = DenialCause::unauthorized("Subject does not have role [admin]");
        assert_eq!(cause.to_string(), "Subject does not have role [admin]");
    }

    proptest! {
        #[test]
        fn classification_is_exclusive(reason in any_reason(), msg in ".*") {
            let cause = DenialCause::new(reason, msg);
            let needs_auth = cause.classification() == Classification::NeedsAuthentication;
            let needs_elevated = cause.classification() == Classification::NeedsElevatedAccess;
            prop_assert!(needs_auth ^ needs_elevated);
            prop_assert_eq!(needs_auth, reason == DenialReason::Unauthenticated);
        }
    }
}
