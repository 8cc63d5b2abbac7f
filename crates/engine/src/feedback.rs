//! User-facing feedback messages and their localization.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use guardian_core::{SessionId, TypeKey};

/// Key of the message shown after a login-required redirect.
pub const LOGIN_REQUIRED_MESSAGE_KEY: &str = "loginRequired";

/// Text used when no localization for [`LOGIN_REQUIRED_MESSAGE_KEY`] exists.
pub const DEFAULT_LOGIN_REQUIRED_MESSAGE: &str = "You need to log in to access this page.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackMessage {
    pub level: FeedbackLevel,
    pub text: String,
    /// Id of the component the message is attached to, if any.
    pub reporter: Option<String>,
    pub at: DateTime<Utc>,
}

impl FeedbackMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Error,
            text: text.into(),
            reporter: None,
            at: Utc::now(),
        }
    }

    pub fn reported_by(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = Some(reporter.into());
        self
    }
}

/// Sink for messages shown to the user on the next rendered page.
pub trait FeedbackChannel {
    fn report(&self, message: FeedbackMessage);
}

/// In-memory, session-scoped feedback store.
#[derive(Debug)]
pub struct SessionFeedback {
    session: SessionId,
    messages: Mutex<Vec<FeedbackMessage>>,
}

impl SessionFeedback {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return everything queued so far (a feedback panel rendering).
    pub fn drain(&self) -> Vec<FeedbackMessage> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl FeedbackChannel for SessionFeedback {
    fn report(&self, message: FeedbackMessage) {
        tracing::debug!(session = %self.session, level = ?message.level, "feedback queued");
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}

/// Resolves message keys to display text, optionally per component type.
pub trait Localizer: Send + Sync {
    fn get(&self, key: &str, component: Option<&TypeKey>) -> Option<String>;
}

/// Table-backed localizer: component-specific entries override global ones.
#[derive(Debug, Clone, Default)]
pub struct BundledMessages {
    global: HashMap<String, String>,
    per_component: HashMap<(TypeKey, String), String>,
}

impl BundledMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.global.insert(key.into(), text.into());
        self
    }

    pub fn with_for(mut self, component: TypeKey, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.per_component.insert((component, key.into()), text.into());
        self
    }
}

impl Localizer for BundledMessages {
    fn get(&self, key: &str, component: Option<&TypeKey>) -> Option<String> {
        component
            .and_then(|c| self.per_component.get(&(c.clone(), key.to_string())))
            .or_else(|| self.global.get(key))
            .cloned()
    }
}

/// Look up `key`, falling back to `default` when the localizer has nothing.
pub fn localize(localizer: &dyn Localizer, key: &str, component: Option<&TypeKey>, default: &str) -> String {
    localizer
        .get(key, component)
        .unwrap_or_else(|| default.to_string())
}
