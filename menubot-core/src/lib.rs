//! # menubot-core
//!
//! Core types and traits for the menu bot: [`Bot`], [`Transport`], [`Handler`], [`Middleware`],
//! inbound message types, errors, and tracing initialization. Transport-agnostic; used by
//! handler-chain, dialogue and menubot-runtime.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{Bot, EventSender, Transport, TransportEvent};
pub use error::{BotError, DefinitionError, Result};
pub use logger::init_tracing;
pub use types::{
    Contact, Conversation, ConversationKind, Handler, HandlerResponse, InboundMessage, Middleware,
    ToCoreMessage,
};
