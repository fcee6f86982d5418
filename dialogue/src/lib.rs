//! # dialogue
//!
//! The conversational menu engine: [`DialogueDefinition`] (named script and menu actions),
//! [`SessionStore`] (where each conversation sits), [`Dispatcher`] (input → next action),
//! [`ActionExecutor`] (steps → transport) and [`MenuHandler`], which ties them into a
//! [`menubot_core::Handler`].

pub mod definition;
pub mod dispatcher;
pub mod executor;
pub mod handler;
pub mod session;
pub mod store;

pub use definition::{
    Action, DialogueDefinition, Menu, MenuOption, Step, StepContent, DEFAULT_WELCOME_ACTION,
};
pub use dispatcher::{normalize, Dispatcher, Resolution, DEFAULT_GREETING_KEYWORDS};
pub use executor::{
    personalize, ActionExecutor, ExecutorConfig, NameStyle, DEFAULT_MENU_DELAY,
    DEFAULT_NAME_FALLBACK, NAME_PLACEHOLDER,
};
pub use handler::MenuHandler;
pub use session::SessionStore;
pub use store::{DefinitionHandle, DefinitionStore, LoadedDefinition};
