//! Walkthrough binary: installs a guardian from the environment and replays a
//! few typical requests, logging every decision.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use guardian_auth::{IdentityProvider, Principal, Requirement, Subject};
use guardian_core::{Action, SessionId, TypeKey};
use guardian_engine::{
    BundledMessages, Guardian, GuardianConfig, RegistryBuilder, RequestCycle, SessionFeedback, TypeDecl,
    LOGIN_REQUIRED_MESSAGE_KEY,
};

const BASE_PAGE: TypeKey = TypeKey::from_static("BasePage");
const DASHBOARD: TypeKey = TypeKey::from_static("Dashboard");
const ADMIN_PANEL: TypeKey = TypeKey::from_static("AdminPanel");
const SIGNUP_BANNER: TypeKey = TypeKey::from_static("SignupBanner");

fn main() -> anyhow::Result<()> {
    guardian_observability::init();

    let config = GuardianConfig::from_env().context("reading guardian configuration")?;

    let registry = RegistryBuilder::with_default_pages()
        .register(TypeDecl::page(BASE_PAGE))
        .register(TypeDecl::page(DASHBOARD).extends(BASE_PAGE).requires(Requirement::User))
        .register(
            TypeDecl::page(ADMIN_PANEL)
                .extends(DASHBOARD)
                .requires(Requirement::role("admin")),
        )
        .register(TypeDecl::component(SIGNUP_BANNER).requires(Requirement::Guest))
        .build()?;

    let guardian = Guardian::install(registry, config)?.with_localizer(Arc::new(
        BundledMessages::new().with(LOGIN_REQUIRED_MESSAGE_KEY, "Please log in to continue."),
    ));

    let callers = [
        ("anonymous", Subject::anonymous()),
        ("remembered", Subject::remembered(Principal::named("rita"))),
        (
            "operator",
            Subject::authenticated(Principal::named("oscar"), Utc::now()).with_role("operator"),
        ),
        (
            "admin",
            Subject::authenticated(Principal::named("ada"), Utc::now()).with_role("admin"),
        ),
    ];

    for (label, subject) in &callers {
        for page in [&DASHBOARD, &ADMIN_PANEL] {
            visit(&guardian, label, subject, page);
        }
    }

    Ok(())
}

fn visit(guardian: &Guardian, label: &str, subject: &dyn IdentityProvider, page: &TypeKey) {
    let feedback = SessionFeedback::new(SessionId::new());
    let mut cycle = RequestCycle::new(subject, &feedback).for_target(page.clone());

    if guardian.can_instantiate(&mut cycle, page) {
        let banner = guardian.can_perform_action(&cycle, &SIGNUP_BANNER, &Action::Render);
        tracing::info!(caller = label, page = %page, signup_banner = banner, "page served");
        return;
    }

    match guardian.on_unauthorized_instantiation(&mut cycle, page) {
        Ok(directive) => tracing::info!(
            caller = label,
            page = %page,
            directive = %serde_json::to_string(&directive).unwrap_or_default(),
            feedback = ?feedback.drain().into_iter().map(|m| m.text).collect::<Vec<_>>(),
            "request redirected"
        ),
        Err(unhandled) => tracing::warn!(caller = label, error = %unhandled, "denial left unhandled"),
    }
}
