//! Per-request state: who is asking, where they were going, what was denied.

use guardian_auth::{DenialCause, IdentityProvider};
use guardian_core::{RequestId, TypeKey};

use crate::feedback::FeedbackChannel;

/// Bridge between a denied instantiation and the navigation it leads to.
///
/// `Empty -> Denied -> Navigated`, or the request ends while still `Denied`
/// and the denial is discarded with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingDenial {
    #[default]
    Empty,
    Denied(DenialCause),
    Navigated,
}

/// Context of one request/transaction, owned by the thread handling it.
///
/// Created by the host for every request and dropped when the request
/// completes; nothing in it is visible to other requests.
pub struct RequestCycle<'a> {
    id: RequestId,
    identity: &'a dyn IdentityProvider,
    feedback: &'a dyn FeedbackChannel,
    target: Option<TypeKey>,
    pending: PendingDenial,
}

impl<'a> RequestCycle<'a> {
    pub fn new(identity: &'a dyn IdentityProvider, feedback: &'a dyn FeedbackChannel) -> Self {
        Self {
            id: RequestId::new(),
            identity,
            feedback,
            target: None,
            pending: PendingDenial::Empty,
        }
    }

    /// The page originally requested, used as the resume point after login.
    pub fn for_target(mut self, target: TypeKey) -> Self {
        self.target = Some(target);
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn identity(&self) -> &'a dyn IdentityProvider {
        self.identity
    }

    pub fn feedback(&self) -> &'a dyn FeedbackChannel {
        self.feedback
    }

    pub fn target(&self) -> Option<&TypeKey> {
        self.target.as_ref()
    }

    pub fn pending(&self) -> &PendingDenial {
        &self.pending
    }

    /// The recorded, not yet consumed denial.
    pub fn pending_denial(&self) -> Option<&DenialCause> {
        match &self.pending {
            PendingDenial::Denied(cause) => Some(cause),
            _ => None,
        }
    }

    pub(crate) fn record_denial(&mut self, cause: DenialCause) {
        self.pending = PendingDenial::Denied(cause);
    }

    /// Forget a stale denial after a later check succeeded.
    pub(crate) fn clear_denial(&mut self) {
        if matches!(self.pending, PendingDenial::Denied(_)) {
            self.pending = PendingDenial::Empty;
        }
    }

    pub(crate) fn take_denial(&mut self) -> Option<DenialCause> {
        match std::mem::take(&mut self.pending) {
            PendingDenial::Denied(cause) => Some(cause),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub(crate) fn mark_navigated(&mut self) {
        self.pending = PendingDenial::Navigated;
    }
}

impl core::fmt::Debug for RequestCycle<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestCycle")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Drop for RequestCycle<'_> {
    fn drop(&mut self) {
        if let PendingDenial::Denied(cause) = &self.pending {
            tracing::debug!(
                request_id = %self.id,
                reason = ?cause.reason(),
                age = ?self.id.started_at().and_then(|t| t.elapsed().ok()),
                "request ended with an unconsumed denial; discarded"
            );
        }
    }
}
