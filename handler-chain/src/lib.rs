//! # Handler chain
//!
//! Runs middleware (before/after) around a sequence of handlers for each inbound message. Middleware
//! can stop the chain; the first handler that returns Stop or Dispatched ends handler execution;
//! middleware `after` runs in reverse order.

use menubot_core::{Handler, HandlerResponse, InboundMessage, Middleware, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain of middleware and handlers.
#[derive(Clone, Default)]
pub struct HandlerChain {
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain (no middleware, no handlers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware (runs before handlers, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a handler (runs in order; first Stop/Dispatched ends the handler phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Runs middleware before, handler before, handlers, handler after (reverse), middleware after (reverse).
    /// Returns the first Stop or Dispatched, or Continue.
    #[instrument(skip(self, message), fields(conversation = %message.conversation.id))]
    pub async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        debug!(message_id = %message.id, "step: handler_chain started");

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            if !mw.before(message).await? {
                debug!(middleware = %mw_name, "step: middleware before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        let mut entered = 0;
        for handler in &self.handlers {
            if !handler.before(message).await? {
                final_response = HandlerResponse::Stop;
                break;
            }
            entered += 1;
        }

        if final_response == HandlerResponse::Continue {
            for handler in &self.handlers {
                let handler_name = std::any::type_name_of_val(handler.as_ref());
                let response = handler.handle(message).await?;
                debug!(handler = %handler_name, response = ?response, "step: handler done");
                match response {
                    HandlerResponse::Stop | HandlerResponse::Dispatched(_) => {
                        final_response = response;
                        break;
                    }
                    HandlerResponse::Continue => continue,
                }
            }
        }

        for handler in self.handlers[..entered].iter().rev() {
            handler.after(message, &final_response).await?;
        }

        for mw in self.middleware.iter().rev() {
            mw.after(message, &final_response).await?;
        }

        if let HandlerResponse::Dispatched(action) = &final_response {
            info!(message_id = %message.id, action = %action, "step: handler_chain dispatched");
        }

        Ok(final_response)
    }
}

// Tests live in tests/handler_chain_test.rs
