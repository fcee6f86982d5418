//! Maps one inbound text to the next action given the conversation's current position.
//!
//! Order of checks: option of the current menu first, greeting keyword second. A menu that
//! reuses a keyword as an option key therefore keeps that key for itself.

use crate::definition::DialogueDefinition;
use crate::session::SessionStore;
use tracing::debug;

/// Keywords that jump back to the welcome action from anywhere.
pub const DEFAULT_GREETING_KEYWORDS: [&str; 4] = ["menu", "oi", "olá", "ola"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Action(String),
    /// Unrecognized free text: nothing is sent and the session is unchanged.
    NoOp,
}

/// Trims and lowercases raw input.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Clone)]
pub struct Dispatcher {
    sessions: SessionStore,
    keywords: Vec<String>,
}

impl Dispatcher {
    /// Keywords are normalized; blank ones are dropped (they would match every message).
    pub fn new<I, S>(sessions: SessionStore, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| normalize(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { sessions, keywords }
    }

    pub fn with_default_keywords(sessions: SessionStore) -> Self {
        Self::new(sessions, DEFAULT_GREETING_KEYWORDS)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn resolve(
        &self,
        conversation_id: &str,
        raw_text: &str,
        definition: &DialogueDefinition,
    ) -> Resolution {
        let input = normalize(raw_text);
        let current = self.sessions.current_or(conversation_id, definition.welcome());

        let option_target = definition
            .get(&current)
            .and_then(|action| action.trailing_menu())
            .and_then(|menu| menu.target_for(&input));
        if let Some(target) = option_target {
            debug!(current = %current, target = %target, "menu option matched");
            return Resolution::Action(target.to_string());
        }

        if self.keywords.iter().any(|k| input.contains(k.as_str())) {
            debug!(current = %current, "greeting keyword matched");
            return Resolution::Action(definition.welcome().to_string());
        }

        Resolution::NoOp
    }
}
