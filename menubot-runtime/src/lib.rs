//! # menubot-runtime
//!
//! Hosts the dialogue engine on a [`menubot_core::Transport`]: env config, middleware, the
//! per-conversation dispatch loop, the lifecycle state machine and [`BotController`], which the
//! operator uses to start, stop and reload the bot. Also ships [`ConsoleTransport`] for local runs.

mod components;
mod config;
mod console;
mod controller;
mod events;
mod lifecycle;
mod middleware;
mod runner;

#[cfg(test)]
mod test;

pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::BotConfig;
pub use console::{ConsoleBot, ConsoleLine, ConsoleTransport};
pub use controller::BotController;
pub use events::{EventBus, StatusEvent};
pub use lifecycle::{BotStatus, BusyGuard, Lifecycle, Transition};
pub use middleware::{ConversationFilter, LoggingMiddleware};
pub use runner::{DispatchHandle, DispatchLoop};
