//! `guardian-core`: shared vocabulary between the host UI framework and the guardian.
//!
//! No authorization logic lives here; only identities of types, requests and
//! sessions plus the non-authorization error model.

pub mod component;
pub mod error;
pub mod id;

pub use component::{Action, Component, ComponentKind, TypeKey};
pub use error::{CoreError, CoreResult};
pub use id::{RequestId, SessionId};
