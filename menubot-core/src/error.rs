//! Error types for the menu bot.
//!
//! [`BotError`] is the top-level error; [`DefinitionError`] describes why a dialogue definition
//! document was rejected.

use thiserror::Error;

/// Top-level error for definition, dispatch, transport, config and IO failures.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a dialogue definition document is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("invalid JSON: {0}")]
    Syntax(String),

    #[error("top-level value must be an object keyed by action name")]
    NotAnObject,

    #[error("action '{action}': {reason}")]
    Shape { action: String, reason: String },
}

impl DefinitionError {
    /// Shorthand for a [`DefinitionError::Shape`] on the given action.
    pub fn shape(action: &str, reason: impl Into<String>) -> Self {
        Self::Shape {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations; uses [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;
