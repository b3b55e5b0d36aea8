//! Identity seam: the sign-in flow is an opaque capability behind a trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// An authenticated session as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Sign-in was cancelled")]
    Cancelled,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// External sign-in capability.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the sign-in flow.
    async fn sign_in(&self) -> Result<Session, IdentityError>;

    /// End the current session, if any.
    async fn sign_out(&self);

    /// A session that is already active, e.g. restored from a previous visit.
    fn current_session(&self) -> Option<Session>;
}

/// In-process identity for terminal use and tests: every sign-in succeeds
/// as a fixed local user.
#[derive(Debug)]
pub struct LocalIdentity {
    user: Session,
    active: Mutex<bool>,
}

impl LocalIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user: Session {
                user_id: user_id.into(),
                display_name: None,
            },
            active: Mutex::new(false),
        }
    }

    /// Start with the session already active.
    pub fn signed_in(self) -> Self {
        self.set_active(true);
        self
    }

    fn set_active(&self, value: bool) {
        if let Ok(mut active) = self.active.lock() {
            *active = value;
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self) -> Result<Session, IdentityError> {
        self.set_active(true);
        Ok(self.user.clone())
    }

    async fn sign_out(&self) {
        self.set_active(false);
    }

    fn current_session(&self) -> Option<Session> {
        match self.active.lock() {
            Ok(active) if *active => Some(self.user.clone()),
            _ => None,
        }
    }
}
