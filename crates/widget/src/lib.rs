//! Client side of the Distillery chat widget.
//!
//! [`ChatController`] is the state machine behind the widget: it owns the
//! displayed transcript and talks to the gateway through a [`ChatTransport`].
//! Sign-in is delegated to an [`IdentityProvider`].

pub mod controller;
pub mod identity;
pub mod state;
pub mod transcript;
pub mod transport;

pub use controller::ChatController;
pub use identity::{IdentityError, IdentityProvider, LocalIdentity, Session};
pub use state::{ChatEvent, ChatState, transition};
pub use transcript::{DisplayedMessage, Speaker, Transcript};
pub use transport::{ChatReply, ChatTransport, HttpTransport, OutboundChat, TransportError};
