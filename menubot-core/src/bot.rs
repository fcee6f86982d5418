//! Transport abstractions.
//!
//! [`Bot`] is the send side (messages, typing indicator). [`Transport`] is the lifecycle side:
//! it is initialized with an event channel and pushes [`TransportEvent`]s into it until destroyed.

use crate::error::Result;
use crate::types::{Conversation, InboundMessage};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Abstraction for sending to a conversation. Implementations map to a messaging transport.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends one text message to the conversation.
    async fn send_message(&self, conversation: &Conversation, text: &str) -> Result<()>;
    /// Shows a "composing" indicator in the conversation.
    async fn send_typing(&self, conversation: &Conversation) -> Result<()>;
}

/// Events pushed by a running transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Inbound(InboundMessage),
    /// Opaque pairing payload (e.g. QR content) the operator must act on.
    PairingChallenge(String),
    Authenticated,
    /// Transport is connected and delivering messages.
    Ready,
    AuthFailure(String),
    Disconnected(String),
}

/// Sender half handed to [`Transport::initialize`].
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Connect/disconnect side of a messaging transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Starts the client; events are delivered on `events` until [`Transport::destroy`].
    /// Returns once the client is launched, not when it is ready.
    async fn initialize(&self, events: EventSender) -> Result<()>;
    /// Tears the client down and drops its event sender.
    async fn destroy(&self) -> Result<()>;
    /// Send side of this transport.
    fn bot(&self) -> Arc<dyn Bot>;
}
