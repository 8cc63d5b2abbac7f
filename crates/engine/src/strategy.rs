//! The authorization strategy consulted by the host framework.

use std::sync::Arc;

use thiserror::Error;

use guardian_auth::{assert_satisfied, explain_authorization, AuthorizationExplanation, DenialCause};
use guardian_core::{Action, Component, TypeKey};

use crate::config::GuardianConfig;
use crate::feedback::{BundledMessages, Localizer};
use crate::navigation::{NavigationDirective, NavigationMapper};
use crate::registry::ComponentRegistry;
use crate::request::RequestCycle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("{setting} '{page}' is not a registered type")]
    UnknownPage { setting: &'static str, page: TypeKey },

    #[error("{setting} '{page}' is registered but is not a page")]
    NotAPage { setting: &'static str, page: TypeKey },
}

/// A denied instantiation the guardian could not redirect.
///
/// Returned when no destination is configured for the denial; the host must
/// let it travel its normal error path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unauthorized instantiation of '{component}'")]
pub struct UnauthorizedInstantiation {
    pub component: TypeKey,
    #[source]
    pub cause: Option<DenialCause>,
}

/// The installed authorization engine.
///
/// Constructed once at startup and handed to whatever builds request
/// contexts; it is `Send + Sync` and holds no per-request state.
#[derive(Debug, Clone)]
pub struct Guardian {
    registry: Arc<ComponentRegistry>,
    config: GuardianConfig,
    mapper: NavigationMapper,
}

impl Guardian {
    /// Validate `config` against `registry` and freeze both.
    pub fn install(registry: ComponentRegistry, config: GuardianConfig) -> Result<Self, InstallError> {
        check_destination(&registry, "login page", config.login_page.as_ref())?;
        check_destination(&registry, "unauthorized page", config.unauthorized_page.as_ref())?;

        let registry = Arc::new(registry);
        let mapper = NavigationMapper::new(
            config.clone(),
            Arc::clone(&registry),
            Arc::new(BundledMessages::new()),
        );

        tracing::info!(
            types = registry.len(),
            login_page = ?config.login_page,
            unauthorized_page = ?config.unauthorized_page,
            "guardian installed"
        );

        Ok(Self {
            registry,
            config,
            mapper,
        })
    }

    /// Replace the bundled (empty) message table. Configuration time only.
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.mapper.set_localizer(localizer);
        self
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    pub fn mapper(&self) -> &NavigationMapper {
        &self.mapper
    }

    /// May a component of type `key` be constructed?
    ///
    /// Only pages are checked; every other type is always instantiable and
    /// gated at render time instead. A denial is recorded in the request for
    /// [`Guardian::on_unauthorized_instantiation`]; any allowed instantiation
    /// clears a stale one.
    pub fn can_instantiate(&self, cycle: &mut RequestCycle<'_>, key: &TypeKey) -> bool {
        if !self.registry.is_page(key) {
            cycle.clear_denial();
            return true;
        }
        self.is_authorized(cycle, key)
    }

    /// Like [`Guardian::can_instantiate`], for any component type.
    pub fn is_authorized(&self, cycle: &mut RequestCycle<'_>, key: &TypeKey) -> bool {
        match assert_satisfied(self.registry.extract(key), cycle.identity()) {
            Ok(()) => {
                cycle.clear_denial();
                true
            }
            Err(cause) => {
                tracing::debug!(
                    request_id = %cycle.id(),
                    component = %key,
                    reason = ?cause.reason(),
                    "instantiation denied"
                );
                cycle.record_denial(cause);
                false
            }
        }
    }

    /// May `component` perform `action`? Only [`Action::Render`] is checked.
    ///
    /// A denial only hides the component: nothing is recorded and no
    /// navigation follows, which is why the request is borrowed immutably.
    pub fn can_perform_action(&self, cycle: &RequestCycle<'_>, component: &dyn Component, action: &Action) -> bool {
        if *action != Action::Render {
            return true;
        }
        let key = component.type_key();
        match assert_satisfied(self.registry.extract(key), cycle.identity()) {
            Ok(()) => true,
            Err(cause) => {
                tracing::trace!(
                    request_id = %cycle.id(),
                    component = %key,
                    reason = ?cause.reason(),
                    "render suppressed"
                );
                false
            }
        }
    }

    /// Hook for the host after an instantiation was refused.
    ///
    /// Consumes the pending denial and maps it to a directive. When no
    /// destination is configured the denial stays pending in the request and
    /// is also handed back inside [`UnauthorizedInstantiation`].
    pub fn on_unauthorized_instantiation(
        &self,
        cycle: &mut RequestCycle<'_>,
        key: &TypeKey,
    ) -> Result<NavigationDirective, UnauthorizedInstantiation> {
        let cause = cycle.take_denial();
        let directive = cause
            .as_ref()
            .and_then(|cause| self.mapper.handle_denial(cycle, Some(key), cause));

        match directive {
            Some(directive) => Ok(directive),
            None => {
                if let Some(cause) = &cause {
                    cycle.record_denial(cause.clone());
                }
                Err(UnauthorizedInstantiation {
                    component: key.clone(),
                    cause,
                })
            }
        }
    }

    /// Hook for the host's error path: map any failure raised while serving
    /// `component`. `None` means the error is still the caller's to handle.
    pub fn handle_error(
        &self,
        cycle: &mut RequestCycle<'_>,
        component: Option<&TypeKey>,
        error: &anyhow::Error,
    ) -> Option<NavigationDirective> {
        self.mapper.handle(cycle, component, error)
    }

    /// Full report of every requirement of `key` against the current caller.
    pub fn explain(&self, cycle: &RequestCycle<'_>, key: &TypeKey) -> AuthorizationExplanation {
        explain_authorization(self.registry.extract(key), cycle.identity())
    }
}

fn check_destination(
    registry: &ComponentRegistry,
    setting: &'static str,
    page: Option<&TypeKey>,
) -> Result<(), InstallError> {
    let Some(page) = page else {
        return Ok(());
    };
    if !registry.contains(page) {
        return Err(InstallError::UnknownPage {
            setting,
            page: page.clone(),
        });
    }
    if !registry.is_page(page) {
        return Err(InstallError::NotAPage {
            setting,
            page: page.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::SessionFeedback;
    use crate::registry::{RegistryBuilder, TypeDecl};
    use crate::PendingDenial;
    use chrono::Utc;
    use guardian_auth::{DenialReason, Principal, Requirement, Subject};
    use guardian_core::SessionId;

    const SECURE: TypeKey = TypeKey::from_static("SecurePage");
    const OPEN: TypeKey = TypeKey::from_static("OpenPage");
    const MEMBERS_PANEL: TypeKey = TypeKey::from_static("MembersPanel");

    fn guardian() -> Guardian {
        let registry = RegistryBuilder::with_default_pages()
            .register(TypeDecl::page(SECURE).requires(Requirement::Authentication))
            .register(TypeDecl::page(OPEN))
            .register(TypeDecl::component(MEMBERS_PANEL).requires(Requirement::User))
            .build()
            .unwrap();
        Guardian::install(registry, GuardianConfig::default()).unwrap()
    }

    #[test]
    fn guardian_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Guardian>();
    }

    #[test]
    fn install_rejects_unregistered_or_non_page_destinations() {
        let registry = RegistryBuilder::new().build().unwrap();
        let err = Guardian::install(registry, GuardianConfig::default()).unwrap_err();
        assert!(matches!(err, InstallError::UnknownPage { setting: "login page", .. }));

        let registry = RegistryBuilder::with_default_pages()
            .register(TypeDecl::component(MEMBERS_PANEL))
            .build()
            .unwrap();
        let config = GuardianConfig::default().with_unauthorized_page(Some(MEMBERS_PANEL));
        let err = Guardian::install(registry, config).unwrap_err();
        assert_eq!(
            err,
            InstallError::NotAPage {
                setting: "unauthorized page",
                page: MEMBERS_PANEL
            }
        );
    }

    #[test]
    fn install_accepts_disabled_destinations() {
        let registry = RegistryBuilder::new().build().unwrap();
        let config = GuardianConfig::default()
            .with_login_page(None)
            .with_unauthorized_page(None);
        assert!(Guardian::install(registry, config).is_ok());
    }

    #[test]
    fn non_pages_are_always_instantiable_but_not_always_authorized() {
        let guardian = guardian();
        let subject = Subject::anonymous();
        let feedback = SessionFeedback::new(SessionId::new());
        let mut cycle = RequestCycle::new(&subject, &feedback);

        assert!(guardian.can_instantiate(&mut cycle, &MEMBERS_PANEL));
        assert!(cycle.pending_denial().is_none());

        assert!(!guardian.is_authorized(&mut cycle, &MEMBERS_PANEL));
        assert_eq!(
            cycle.pending_denial().map(DenialCause::reason),
            Some(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn success_clears_stale_denial() {
        let guardian = guardian();
        let subject = Subject::anonymous();
        let feedback = SessionFeedback::new(SessionId::new());
        let mut cycle = RequestCycle::new(&subject, &feedback);

        assert!(!guardian.can_instantiate(&mut cycle, &SECURE));
        assert!(cycle.pending_denial().is_some());

        assert!(guardian.can_instantiate(&mut cycle, &OPEN));
        assert_eq!(cycle.pending(), &PendingDenial::Empty);
    }

    #[test]
    fn instantiating_a_non_page_clears_stale_denial() {
        let guardian = guardian();
        let subject = Subject::anonymous();
        let feedback = SessionFeedback::new(SessionId::new());
        let mut cycle = RequestCycle::new(&subject, &feedback);

        assert!(!guardian.can_instantiate(&mut cycle, &SECURE));
        assert!(cycle.pending_denial().is_some());

        assert!(guardian.can_instantiate(&mut cycle, &MEMBERS_PANEL));
        assert_eq!(cycle.pending(), &PendingDenial::Empty);
    }

    #[test]
    fn unhandled_denial_stays_pending() {
        let registry = RegistryBuilder::with_default_pages()
            .register(TypeDecl::page(SECURE).requires(Requirement::Authentication))
            .build()
            .unwrap();
        let guardian = Guardian::install(registry, GuardianConfig::default().with_login_page(None)).unwrap();
        let subject = Subject::anonymous();
        let feedback = SessionFeedback::new(SessionId::new());
        let mut cycle = RequestCycle::new(&subject, &feedback);

        assert!(!guardian.can_instantiate(&mut cycle, &SECURE));
        let err = guardian.on_unauthorized_instantiation(&mut cycle, &SECURE).unwrap_err();

        assert_eq!(cycle.pending_denial(), err.cause.as_ref());
        assert!(matches!(cycle.pending(), PendingDenial::Denied(cause) if cause.reason() == DenialReason::Unauthenticated));
        assert!(feedback.messages().is_empty());
    }

    #[test]
    fn only_render_is_checked() {
        let guardian = guardian();
        let subject = Subject::anonymous();
        let feedback = SessionFeedback::new(SessionId::new());
        let cycle = RequestCycle::new(&subject, &feedback);

        assert!(!guardian.can_perform_action(&cycle, &MEMBERS_PANEL, &Action::Render));
        assert!(guardian.can_perform_action(&cycle, &MEMBERS_PANEL, &Action::Enable));
        assert!(guardian.can_perform_action(&cycle, &MEMBERS_PANEL, &Action::Named("submit".into())));
        assert!(cycle.pending_denial().is_none());
    }

    #[test]
    fn remembered_caller_is_sent_to_login_for_fresh_authentication() {
        let guardian = guardian();
        let subject = Subject::remembered(Principal::named("alice"));
        let feedback = SessionFeedback::new(SessionId::new());
        let mut cycle = RequestCycle::new(&subject, &feedback);

        assert!(!guardian.can_instantiate(&mut cycle, &SECURE));
        let directive = guardian.on_unauthorized_instantiation(&mut cycle, &SECURE).unwrap();
        assert_eq!(
            directive,
            NavigationDirective::RedirectToLogin {
                login_page: crate::LOGIN_PAGE,
                resume: Some(SECURE),
            }
        );
        assert_eq!(cycle.pending(), &PendingDenial::Navigated);
    }

    #[test]
    fn hook_without_pending_denial_reports_unhandled() {
        let guardian = guardian();
        let subject = Subject::authenticated(Principal::named("bob"), Utc::now());
        let feedback = SessionFeedback::new(SessionId::new());
        let mut cycle = RequestCycle::new(&subject, &feedback);

        let err = guardian.on_unauthorized_instantiation(&mut cycle, &SECURE).unwrap_err();
        assert_eq!(err.component, SECURE);
        assert!(err.cause.is_none());
    }

    #[test]
    fn explain_reports_requirements_of_type() {
        let guardian = guardian();
        let subject = Subject::remembered(Principal::named("alice"));
        let feedback = SessionFeedback::new(SessionId::new());
        let cycle = RequestCycle::new(&subject, &feedback);

        let explanation = guardian.explain(&cycle, &SECURE);
        assert!(!explanation.granted);
        assert_eq!(explanation.checks.len(), 1);
    }
}
