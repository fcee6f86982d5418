//! [`MenuHandler`]: the chain handler that resolves and executes one inbound message.

use crate::dispatcher::{Dispatcher, Resolution};
use crate::executor::ActionExecutor;
use crate::store::DefinitionHandle;
use async_trait::async_trait;
use menubot_core::{Handler, HandlerResponse, InboundMessage, Result};
use tracing::{debug, instrument};

/// Resolves the next action against a definition snapshot and executes it.
///
/// The snapshot is taken once per message, so a definition swap never affects an execution in
/// progress. Execution errors are returned to the caller, which logs them; nothing is sent to the
/// user on failure.
pub struct MenuHandler {
    dispatcher: Dispatcher,
    executor: ActionExecutor,
    definitions: DefinitionHandle,
}

impl MenuHandler {
    pub fn new(
        dispatcher: Dispatcher,
        executor: ActionExecutor,
        definitions: DefinitionHandle,
    ) -> Self {
        Self {
            dispatcher,
            executor,
            definitions,
        }
    }
}

#[async_trait]
impl Handler for MenuHandler {
    #[instrument(skip(self, message), fields(conversation = %message.conversation.id))]
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let definition = self.definitions.snapshot();
        match self
            .dispatcher
            .resolve(&message.conversation.id, &message.text, &definition)
        {
            Resolution::NoOp => {
                debug!(message_id = %message.id, "no action for input");
                Ok(HandlerResponse::Stop)
            }
            Resolution::Action(action) => {
                self.executor
                    .execute(
                        &message.conversation,
                        &action,
                        message.sender.display_name.as_deref(),
                        &definition,
                    )
                    .await?;
                Ok(HandlerResponse::Dispatched(action))
            }
        }
    }
}
