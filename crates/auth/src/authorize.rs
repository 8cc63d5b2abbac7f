use serde::Serialize;

use crate::{
    DenialCause, IdentityProvider, Logical, Permission, Requirement, RequirementKind,
    RequirementSet, Role,
};

const NOT_AUTHENTICATED: &str = "The current caller is not authenticated. Access denied.";
const REMEMBERED_ONLY: &str = "The current caller was remembered from a previous login but has not \
authenticated in this session. Access denied.";
const NOT_A_USER: &str = "Attempting to perform a user-only operation. The current caller is not a \
user (they have not been authenticated or remembered from a previous login). Access denied.";
const NOT_A_GUEST: &str = "Attempting to perform a guest-only operation. The current caller is not a \
guest (they have been authenticated or remembered from a previous login). Access denied.";
const ANONYMOUS: &str = "The current caller is anonymous; permission and role checks require an \
identity to check against. Access denied.";

/// Evaluate a single requirement against the current caller.
///
/// - No IO
/// - No panics
/// - The identity provider is the only source of truth
pub fn check(requirement: &Requirement, identity: &dyn IdentityProvider) -> Result<(), DenialCause> {
    let kind = requirement.kind();
    let denial = match requirement {
        Requirement::Authentication => {
            if identity.is_authenticated() {
                None
            } else if identity.is_remembered() {
                Some(DenialCause::unauthenticated(REMEMBERED_ONLY))
            } else {
                Some(DenialCause::unauthenticated(NOT_AUTHENTICATED))
            }
        }
        Requirement::User => (!identity.is_known()).then(|| DenialCause::unauthenticated(NOT_A_USER)),
        Requirement::Guest => identity
            .is_known()
            .then(|| DenialCause::guest_violation(NOT_A_GUEST)),
        Requirement::Permissions { permissions, logical } => {
            check_granted(identity, permissions, *logical, |p| identity.is_permitted(p), "permission")
        }
        Requirement::Roles { roles, logical } => {
            check_granted(identity, roles, *logical, |r: &Role| identity.has_role(r), "role")
        }
    };

    match denial {
        None => Ok(()),
        Some(cause) => Err(cause.with_origin(kind)),
    }
}

fn check_granted<T, F>(
    identity: &dyn IdentityProvider,
    required: &[T],
    logical: Logical,
    holds: F,
    noun: &str,
) -> Option<DenialCause>
where
    T: core::fmt::Display,
    F: Fn(&T) -> bool,
{
    if required.is_empty() {
        return None;
    }
    if !identity.is_known() {
        return Some(DenialCause::unauthenticated(ANONYMOUS));
    }

    match logical {
        Logical::And => required
            .iter()
            .find(|value| !holds(value))
            .map(|missing| DenialCause::unauthorized(format!("Caller does not have {noun} [{missing}]"))),
        Logical::Or => {
            if required.iter().any(|value| holds(value)) {
                None
            } else {
                let listed: Vec<String> = required.iter().map(ToString::to_string).collect();
                Some(DenialCause::unauthorized(format!(
                    "Caller has none of the {noun}s [{}]",
                    listed.join(", ")
                )))
            }
        }
    }
}

/// Check every requirement of a set, in order, stopping at the first failure.
///
/// The first violated requirement alone decides the outcome; later failures
/// are not collected. An empty set always passes.
pub fn assert_satisfied(
    requirements: &RequirementSet,
    identity: &dyn IdentityProvider,
) -> Result<(), DenialCause> {
    for requirement in requirements {
        if let Err(cause) = check(requirement, identity) {
            tracing::debug!(
                requirement = ?requirement.kind(),
                reason = ?cause.reason(),
                "requirement not satisfied"
            );
            return Err(cause);
        }
    }
    Ok(())
}

/// Convenience for backend code: fail unless the caller holds `permission`.
pub fn require_permission(
    identity: &dyn IdentityProvider,
    permission: &Permission,
) -> Result<(), DenialCause> {
    check(
        &Requirement::Permissions {
            permissions: vec![permission.clone()],
            logical: Logical::And,
        },
        identity,
    )
}

/// Convenience for backend code: fail unless the caller holds `role`.
pub fn require_role(identity: &dyn IdentityProvider, role: &Role) -> Result<(), DenialCause> {
    check(
        &Requirement::Roles {
            roles: vec![role.clone()],
            logical: Logical::And,
        },
        identity,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// Unlike [`assert_satisfied`] this evaluates every requirement, so it shows
/// everything the caller is missing, not only the deciding failure.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub granted: bool,
    pub caller: CallerState,
    pub checks: Vec<RequirementCheck>,
    /// The denial [`assert_satisfied`] would report.
    pub deciding_denial: Option<DenialCause>,
}

/// What the identity provider said about the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CallerState {
    pub principal: Option<String>,
    pub authenticated: bool,
    pub remembered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementCheck {
    pub requirement: Requirement,
    pub kind: RequirementKind,
    pub satisfied: bool,
    pub denial: Option<DenialCause>,
}

pub fn explain_authorization(
    requirements: &RequirementSet,
    identity: &dyn IdentityProvider,
) -> AuthorizationExplanation {
    let checks: Vec<RequirementCheck> = requirements
        .iter()
        .map(|requirement| {
            let denial = check(requirement, identity).err();
            RequirementCheck {
                requirement: requirement.clone(),
                kind: requirement.kind(),
                satisfied: denial.is_none(),
                denial,
            }
        })
        .collect();

    let deciding_denial = checks.iter().find_map(|c| c.denial.clone());

    AuthorizationExplanation {
        granted: deciding_denial.is_none(),
        caller: CallerState {
            principal: identity.principal().map(|p| p.name.clone()),
            authenticated: identity.is_authenticated(),
            remembered: identity.is_remembered(),
        },
        checks,
        deciding_denial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classification, DenialReason, Principal, Subject};
    use chrono::Utc;

    fn fresh() -> Subject {
        Subject::authenticated(Principal::named("alice"), Utc::now())
    }

    fn remembered() -> Subject {
        Subject::remembered(Principal::named("alice"))
    }

    fn set(reqs: impl IntoIterator<Item = Requirement>) -> RequirementSet {
        reqs.into_iter().collect()
    }

    #[test]
    fn empty_set_always_passes() {
        assert!(assert_satisfied(&RequirementSet::new(), &Subject::anonymous()).is_ok());
    }

    #[test]
    fn authentication_requires_fresh_identity() {
        let reqs = set([Requirement::Authentication]);
        assert!(assert_satisfied(&reqs, &fresh()).is_ok());

        let err = assert_satisfied(&reqs, &remembered()).unwrap_err();
        assert_eq!(err.classification(), Classification::NeedsAuthentication);
        assert_eq!(err.origin(), Some(RequirementKind::Authentication));

        let err = assert_satisfied(&reqs, &Subject::anonymous()).unwrap_err();
        assert_eq!(err.reason(), DenialReason::Unauthenticated);
    }

    #[test]
    fn user_accepts_remembered_identity() {
        let reqs = set([Requirement::User]);
        assert!(assert_satisfied(&reqs, &remembered()).is_ok());
        assert!(assert_satisfied(&reqs, &fresh()).is_ok());
        let err = assert_satisfied(&reqs, &Subject::anonymous()).unwrap_err();
        assert!(err.needs_authentication());
    }

    #[test]
    fn guest_rejects_any_identity_as_guest_violation() {
        let reqs = set([Requirement::Guest]);
        assert!(assert_satisfied(&reqs, &Subject::anonymous()).is_ok());

        for caller in [fresh(), remembered()] {
            let err = assert_satisfied(&reqs, &caller).unwrap_err();
            assert_eq!(err.reason(), DenialReason::GuestViolation);
            assert_eq!(err.classification(), Classification::NeedsElevatedAccess);
        }
    }

    #[test]
    fn role_requirement_classifies_missing_role_as_elevated_access() {
        let reqs = set([Requirement::role("admin")]);

        let err = assert_satisfied(&reqs, &fresh()).unwrap_err();
        assert_eq!(err.classification(), Classification::NeedsElevatedAccess);
        assert!(err.message().contains("admin"));

        assert!(assert_satisfied(&reqs, &fresh().with_role("admin")).is_ok());
    }

    #[test]
    fn anonymous_role_check_needs_authentication() {
        let err = assert_satisfied(&set([Requirement::role("admin")]), &Subject::anonymous()).unwrap_err();
        assert_eq!(err.classification(), Classification::NeedsAuthentication);
        assert_eq!(err.origin(), Some(RequirementKind::Role));
    }

    #[test]
    fn logical_or_needs_any_single_grant() {
        let reqs = set([Requirement::permissions(
            [Permission::new("report:read"), Permission::new("report:audit")],
            Logical::Or,
        )]);
        assert!(assert_satisfied(&reqs, &fresh().with_permission("report:audit")).is_ok());

        let err = assert_satisfied(&reqs, &fresh()).unwrap_err();
        assert!(err.message().contains("report:read, report:audit"));
    }

    #[test]
    fn logical_and_names_first_missing_grant() {
        let reqs = set([Requirement::permissions(
            [Permission::new("report:read"), Permission::new("report:write")],
            Logical::And,
        )]);
        let err = assert_satisfied(&reqs, &fresh().with_permission("report:read")).unwrap_err();
        assert!(err.message().contains("report:write"));
    }

    #[test]
    fn first_failure_decides() {
        let reqs = set([Requirement::role("admin"), Requirement::Authentication]);
        let err = assert_satisfied(&reqs, &remembered()).unwrap_err();
        assert_eq!(err.origin(), Some(RequirementKind::Role));
    }

    #[test]
    fn backend_helpers_produce_denials() {
        let caller = fresh().with_permission("invoice:*");
        assert!(require_permission(&caller, &Permission::new("invoice:void")).is_ok());
        assert!(require_role(&caller, &Role::new("auditor")).is_err());
    }

    #[test]
    fn explanation_lists_every_failure() {
        let reqs = set([Requirement::role("admin"), Requirement::Authentication, Requirement::User]);
        let explanation = explain_authorization(&reqs, &remembered());

        assert!(!explanation.granted);
        assert_eq!(explanation.checks.len(), 3);
        assert_eq!(
            explanation.checks.iter().filter(|c| !c.satisfied).count(),
            2
        );
        assert_eq!(
            explanation.deciding_denial.as_ref().and_then(DenialCause::origin),
            Some(RequirementKind::Role)
        );
        assert_eq!(explanation.caller.principal.as_deref(), Some("alice"));

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["granted"], false);
    }
}
