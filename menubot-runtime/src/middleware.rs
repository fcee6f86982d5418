//! Chain middleware: drop messages the dispatcher must never see, and log the rest.

use async_trait::async_trait;
use menubot_core::{ConversationKind, HandlerResponse, InboundMessage, Middleware, Result};
use tracing::{debug, info, instrument};

/// Stops the chain for the bot's own echoed messages and for non one-to-one conversations.
pub struct ConversationFilter;

#[async_trait]
impl Middleware for ConversationFilter {
    async fn before(&self, message: &InboundMessage) -> Result<bool> {
        if message.from_me {
            debug!(conversation = %message.conversation.id, "skipping own message");
            return Ok(false);
        }
        if message.conversation.kind != ConversationKind::Individual {
            debug!(
                conversation = %message.conversation.id,
                kind = ?message.conversation.kind,
                "skipping non-individual conversation"
            );
            return Ok(false);
        }
        Ok(true)
    }

    async fn after(&self, _message: &InboundMessage, _response: &HandlerResponse) -> Result<()> {
        Ok(())
    }
}

/// Logs each message in before() and the response in after(); always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &InboundMessage) -> Result<bool> {
        info!(
            conversation = %message.conversation.id,
            sender = %message.sender.display_name.as_deref().unwrap_or("unknown"),
            message_content = %message.text,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &InboundMessage, response: &HandlerResponse) -> Result<()> {
        debug!(message_id = %message.id, response = ?response, "Processed message");
        Ok(())
    }
}
