//! The client chat controller.
//!
//! Gates sending behind sign-in, appends the user's message before the
//! network call resolves, and collapses every failure into one fallback
//! message. Sending is split into [`ChatController::begin_send`] and
//! [`ChatController::complete`] so a UI can render the optimistic message
//! while the call is in flight; [`ChatController::send`] does both.

use std::sync::Arc;

use tracing::{debug, info, warn};

use distillery_config::AppConfig;

use crate::identity::{IdentityError, IdentityProvider, Session};
use crate::state::{ChatEvent, ChatState, transition};
use crate::transcript::{DisplayedMessage, Speaker, Transcript};
use crate::transport::{ChatReply, ChatTransport, OutboundChat, TransportError};

pub struct ChatController {
    identity: Arc<dyn IdentityProvider>,
    transport: Arc<dyn ChatTransport>,
    state: ChatState,
    session: Option<Session>,
    transcript: Transcript,
    fallback_message: String,
}

impl ChatController {
    /// Starts `Idle` when the identity provider already reports a session.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        transport: Arc<dyn ChatTransport>,
        greeting: impl Into<String>,
        fallback_message: impl Into<String>,
    ) -> Self {
        let session = identity.current_session();
        let state = if session.is_some() {
            ChatState::Idle
        } else {
            ChatState::Unauthenticated
        };

        Self {
            identity,
            transport,
            state,
            session,
            transcript: Transcript::new(greeting),
            fallback_message: fallback_message.into(),
        }
    }

    pub fn from_config(
        identity: Arc<dyn IdentityProvider>,
        transport: Arc<dyn ChatTransport>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            identity,
            transport,
            &config.assistant.greeting,
            &config.assistant.fallback_message,
        )
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn can_send(&self) -> bool {
        self.state.can_send()
    }

    fn apply(&mut self, event: ChatEvent) -> bool {
        match transition(self.state, event) {
            Some(next) => {
                debug!(from = ?self.state, to = ?next, ?event, "Chat state transition");
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Run the identity provider's sign-in flow.
    ///
    /// Returns `Ok(false)` when sign-in is not accepted in the current state.
    /// A failed sign-in leaves the state unchanged.
    pub async fn sign_in(&mut self) -> Result<bool, IdentityError> {
        if transition(self.state, ChatEvent::SignedIn).is_none() {
            return Ok(false);
        }

        let session = self.identity.sign_in().await?;
        info!(user_id = %session.user_id, "Signed in");
        self.session = Some(session);
        Ok(self.apply(ChatEvent::SignedIn))
    }

    /// End the session. The displayed transcript is kept.
    pub async fn sign_out(&mut self) -> bool {
        if transition(self.state, ChatEvent::SignedOut).is_none() {
            return false;
        }

        self.identity.sign_out().await;
        self.session = None;
        info!("Signed out");
        self.apply(ChatEvent::SignedOut)
    }

    /// Accept `input` for sending.
    ///
    /// Returns the outbound turn to deliver, or `None` when nothing may be
    /// sent: not signed in, a reply is pending, or the input is blank. On
    /// acceptance the user's message is already in the transcript.
    pub fn begin_send(&mut self, input: &str) -> Option<OutboundChat> {
        if input.trim().is_empty() || !self.apply(ChatEvent::Submit) {
            return None;
        }

        // History is taken before the new message is appended.
        let history = self.transcript.wire_history();
        self.transcript.push(Speaker::User, input);

        Some(OutboundChat {
            message: input.to_string(),
            history,
        })
    }

    /// Resolve the in-flight turn.
    ///
    /// Appends the reply, or the fallback message on any failure. A result
    /// arriving after sign-out is discarded and `None` is returned.
    pub fn complete(
        &mut self,
        result: Result<ChatReply, TransportError>,
    ) -> Option<&DisplayedMessage> {
        let (event, content) = match result {
            Ok(reply) => {
                debug!(searches_used = reply.searches_used, "Reply received");
                (ChatEvent::ReplyReceived, reply.message)
            }
            Err(e) => {
                warn!(error = %e, "Chat error");
                (ChatEvent::ReplyFailed, self.fallback_message.clone())
            }
        };

        if !self.apply(event) {
            debug!(state = ?self.state, "Discarding reply outside of a pending send");
            return None;
        }
        Some(self.transcript.push(Speaker::Agent, content))
    }

    /// Send `input` and wait for the outcome.
    ///
    /// `None` means nothing was sent.
    pub async fn send(&mut self, input: &str) -> Option<&DisplayedMessage> {
        let outbound = self.begin_send(input)?;
        let result = self.transport.send(&outbound).await;
        self.complete(result)
    }
}
