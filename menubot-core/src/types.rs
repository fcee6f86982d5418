//! Core types: conversation, contact, inbound message, handler response, Handler and Middleware traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of conversation reported by the transport. Only [`ConversationKind::Individual`] is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationKind {
    Individual,
    Group,
    Other,
}

/// Conversation identity. `id` is an opaque transport handle and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
}

impl Conversation {
    /// One-to-one conversation with the given id.
    pub fn individual(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ConversationKind::Individual,
        }
    }
}

/// Sender as known to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Push/display name chosen by the sender; may be absent.
    pub display_name: Option<String>,
}

/// A single inbound text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub conversation: Conversation,
    pub sender: Contact,
    pub text: String,
    /// True when the transport echoes back a message the bot itself sent.
    pub from_me: bool,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Message from a one-to-one conversation, stamped now.
    pub fn new(
        id: impl Into<String>,
        conversation: Conversation,
        display_name: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation,
            sender: Contact { display_name },
            text: text.into(),
            from_me: false,
            received_at: Utc::now(),
        }
    }
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; nothing was dispatched.
    Stop,
    /// Stop the chain; the named action was executed.
    Dispatched(String),
}

/// Converts a transport-specific message type to core [`InboundMessage`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> InboundMessage;
}

/// Single handler concept: optional before / handle / after.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _message: &InboundMessage) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the message. Return Stop or Dispatched to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &InboundMessage) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &InboundMessage,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}

/// Wraps the whole handler phase: `before` runs in order and may stop the chain, `after` runs in reverse.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn before(&self, message: &InboundMessage) -> crate::error::Result<bool>;
    async fn after(
        &self,
        message: &InboundMessage,
        response: &HandlerResponse,
    ) -> crate::error::Result<()>;
}
