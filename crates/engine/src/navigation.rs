//! Turns authorization failures into navigation directives.
//!
//! The mapper never raises: it returns a [`NavigationDirective`] for the host's
//! routing layer to carry out, or `None` when the failure is not its concern or
//! no destination is configured.

use std::sync::Arc;

use serde::Serialize;

use guardian_auth::{Classification, DenialCause};
use guardian_core::TypeKey;

use crate::config::GuardianConfig;
use crate::feedback::{
    localize, FeedbackMessage, Localizer, DEFAULT_LOGIN_REQUIRED_MESSAGE, LOGIN_REQUIRED_MESSAGE_KEY,
};
use crate::registry::ComponentRegistry;
use crate::request::RequestCycle;

/// What the host should do instead of serving the denied page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum NavigationDirective {
    /// Send the caller to the login page; once logged in, continue at `resume`.
    RedirectToLogin {
        login_page: TypeKey,
        resume: Option<TypeKey>,
    },
    /// Send the caller to the unauthorized page. Terminal: nothing resumes.
    RedirectToUnauthorized { page: TypeKey },
}

/// How an arbitrary failure relates to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure<'e> {
    NeedsAuthentication(&'e DenialCause),
    NeedsElevatedAccess(&'e DenialCause),
    NotAnAuthorizationFailure,
}

/// Classify `error` by the first [`DenialCause`] anywhere in its source chain.
pub fn classify(error: &anyhow::Error) -> Failure<'_> {
    match error.chain().find_map(|e| e.downcast_ref::<DenialCause>()) {
        Some(cause) => classify_cause(cause),
        None => Failure::NotAnAuthorizationFailure,
    }
}

pub fn classify_cause(cause: &DenialCause) -> Failure<'_> {
    match cause.classification() {
        Classification::NeedsAuthentication => Failure::NeedsAuthentication(cause),
        Classification::NeedsElevatedAccess => Failure::NeedsElevatedAccess(cause),
    }
}

#[derive(Clone)]
pub struct NavigationMapper {
    config: GuardianConfig,
    registry: Arc<ComponentRegistry>,
    localizer: Arc<dyn Localizer>,
}

impl NavigationMapper {
    pub fn new(config: GuardianConfig, registry: Arc<ComponentRegistry>, localizer: Arc<dyn Localizer>) -> Self {
        Self {
            config,
            registry,
            localizer,
        }
    }

    pub(crate) fn set_localizer(&mut self, localizer: Arc<dyn Localizer>) {
        self.localizer = localizer;
    }

    /// Handle an arbitrary failure raised while serving `denied` (if known).
    ///
    /// Non-authorization failures are ignored. A `None` result for an
    /// authorization failure means no destination is configured and the
    /// caller still owns the error.
    pub fn handle(
        &self,
        cycle: &mut RequestCycle<'_>,
        denied: Option<&TypeKey>,
        error: &anyhow::Error,
    ) -> Option<NavigationDirective> {
        match classify(error) {
            Failure::NotAnAuthorizationFailure => None,
            Failure::NeedsAuthentication(cause) | Failure::NeedsElevatedAccess(cause) => {
                self.handle_denial(cycle, denied, cause)
            }
        }
    }

    /// Map a known denial to a directive, recording the navigation on success.
    pub fn handle_denial(
        &self,
        cycle: &mut RequestCycle<'_>,
        denied: Option<&TypeKey>,
        cause: &DenialCause,
    ) -> Option<NavigationDirective> {
        let directive = match classify_cause(cause) {
            Failure::NeedsAuthentication(_) => self.login_redirect(cycle, denied),
            _ => self
                .config
                .unauthorized_page
                .clone()
                .map(|page| NavigationDirective::RedirectToUnauthorized { page }),
        };

        match &directive {
            Some(directive) => {
                tracing::debug!(request_id = %cycle.id(), ?directive, "denial mapped to navigation");
                cycle.mark_navigated();
            }
            None => tracing::warn!(
                request_id = %cycle.id(),
                reason = ?cause.reason(),
                "no destination configured for denial; leaving it unhandled"
            ),
        }
        directive
    }

    fn login_redirect(&self, cycle: &RequestCycle<'_>, denied: Option<&TypeKey>) -> Option<NavigationDirective> {
        let login_page = self.config.login_page.clone()?;

        let message = localize(
            self.localizer.as_ref(),
            LOGIN_REQUIRED_MESSAGE_KEY,
            denied,
            DEFAULT_LOGIN_REQUIRED_MESSAGE,
        );
        cycle.feedback().report(FeedbackMessage::error(message));

        Some(NavigationDirective::RedirectToLogin {
            login_page,
            resume: self.resume_point(cycle, denied),
        })
    }

    /// The denied type when it is itself a page, else the requested page.
    fn resume_point(&self, cycle: &RequestCycle<'_>, denied: Option<&TypeKey>) -> Option<TypeKey> {
        denied
            .filter(|key| self.registry.is_page(key))
            .or_else(|| cycle.target())
            .cloned()
    }
}

impl core::fmt::Debug for NavigationMapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NavigationMapper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
