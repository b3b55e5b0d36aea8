//! Chat controller states and the transition table.
//!
//! Failures are not a resting state: a failed reply appends the fallback
//! message and lands in [`ChatState::Idle`] within the same step.

use serde::{Deserialize, Serialize};

/// Where the controller currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    /// No session; sending is disabled
    Unauthenticated,
    /// Signed in and ready for input
    Idle,
    /// A request is in flight; sending is disabled
    Sending,
}

impl ChatState {
    /// Whether the send affordance is enabled.
    pub fn can_send(self) -> bool {
        matches!(self, ChatState::Idle)
    }

    pub fn is_authenticated(self) -> bool {
        !matches!(self, ChatState::Unauthenticated)
    }
}

/// Inputs that may move the controller between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatEvent {
    /// The identity provider granted a session
    SignedIn,
    /// The session was ended
    SignedOut,
    /// A non-empty message was submitted
    Submit,
    /// The gateway answered
    ReplyReceived,
    /// The gateway call failed for any reason
    ReplyFailed,
}

/// The full transition table. `None` means the event is not accepted in
/// that state and nothing happens.
pub fn transition(state: ChatState, event: ChatEvent) -> Option<ChatState> {
    use ChatEvent::*;
    use ChatState::*;

    match (state, event) {
        (Unauthenticated | Idle, SignedIn) => Some(Idle),
        (Idle | Sending, SignedOut) => Some(Unauthenticated),
        (Idle, Submit) => Some(Sending),
        (Sending, ReplyReceived | ReplyFailed) => Some(Idle),
        _ => None,
    }
}
