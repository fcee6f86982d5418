//! Builds the engine pieces shared by the controller and the dispatch loop.

use std::sync::Arc;

use dialogue::{
    ActionExecutor, DefinitionHandle, DialogueDefinition, Dispatcher, MenuHandler, SessionStore,
};
use handler_chain::HandlerChain;
use menubot_core::Bot;

use crate::config::BotConfig;
use crate::middleware::{ConversationFilter, LoggingMiddleware};

/// Session store, definition snapshot handle, and the handler chain that uses them.
#[derive(Clone)]
pub struct BotComponents {
    pub sessions: SessionStore,
    pub definitions: DefinitionHandle,
    pub handler_chain: HandlerChain,
}

/// Wires sessions, dispatcher, executor and [`MenuHandler`] behind the filter and logging middleware.
pub fn build_bot_components(
    config: &BotConfig,
    bot: Arc<dyn Bot>,
    definition: DialogueDefinition,
) -> BotComponents {
    let sessions = SessionStore::new();
    let definitions = DefinitionHandle::new(definition);
    let dispatcher = Dispatcher::new(sessions.clone(), &config.greeting_keywords);
    let executor = ActionExecutor::new(bot, sessions.clone(), config.executor_config());
    let handler_chain = build_handler_chain(MenuHandler::new(
        dispatcher,
        executor,
        definitions.clone(),
    ));
    BotComponents {
        sessions,
        definitions,
        handler_chain,
    }
}

/// Filter first so self/group messages are never logged as dispatch candidates.
pub fn build_handler_chain(menu: MenuHandler) -> HandlerChain {
    HandlerChain::new()
        .add_middleware(Arc::new(ConversationFilter))
        .add_middleware(Arc::new(LoggingMiddleware))
        .add_handler(Arc::new(menu))
}
