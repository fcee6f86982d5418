//! Sends an action's steps through the [`Bot`] and advances the conversation's session.

use crate::definition::{Action, DialogueDefinition, Step, StepContent};
use crate::session::SessionStore;
use menubot_core::{Bot, BotError, Conversation, Result};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Token replaced by the sender's name in outgoing text.
pub const NAME_PLACEHOLDER: &str = "{NOME_CLIENTE}";
pub const DEFAULT_NAME_FALLBACK: &str = "amigo(a)";
pub const DEFAULT_MENU_DELAY: Duration = Duration::from_millis(1000);

/// Which part of the display name replaces [`NAME_PLACEHOLDER`]. One rule for every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameStyle {
    /// First whitespace-separated token ("Maria Silva" → "Maria").
    #[default]
    FirstName,
    FullName,
}

impl FromStr for NameStyle {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_name" => Ok(NameStyle::FirstName),
            "full" | "full_name" => Ok(NameStyle::FullName),
            other => Err(BotError::Config(format!(
                "unknown name style '{}', expected 'first' or 'full'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub name_style: NameStyle,
    pub name_fallback: String,
    /// Pause before a standalone menu action is sent.
    pub menu_delay: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            name_style: NameStyle::default(),
            name_fallback: DEFAULT_NAME_FALLBACK.to_string(),
            menu_delay: DEFAULT_MENU_DELAY,
        }
    }
}

impl ExecutorConfig {
    /// Name that replaces the placeholder for a sender with `display_name`.
    pub fn name_for(&self, display_name: Option<&str>) -> String {
        let name = display_name.map(str::trim).filter(|n| !n.is_empty());
        match (name, self.name_style) {
            (Some(n), NameStyle::FirstName) => n
                .split_whitespace()
                .next()
                .unwrap_or(n)
                .to_string(),
            (Some(n), NameStyle::FullName) => n.to_string(),
            (None, _) => self.name_fallback.clone(),
        }
    }
}

/// Replaces every occurrence of [`NAME_PLACEHOLDER`].
pub fn personalize(text: &str, name: &str) -> String {
    text.replace(NAME_PLACEHOLDER, name)
}

#[derive(Clone)]
pub struct ActionExecutor {
    bot: Arc<dyn Bot>,
    sessions: SessionStore,
    config: ExecutorConfig,
}

impl ActionExecutor {
    pub fn new(bot: Arc<dyn Bot>, sessions: SessionStore, config: ExecutorConfig) -> Self {
        Self {
            bot,
            sessions,
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs every step of `action_name`, then moves the session: to the action itself when it
    /// waits at a menu, otherwise back to the welcome action.
    ///
    /// Errors leave the session as it was. A send failure stops the remaining steps; messages
    /// already sent are not retracted.
    #[instrument(skip(self, conversation, display_name, definition), fields(conversation = %conversation.id))]
    pub async fn execute(
        &self,
        conversation: &Conversation,
        action_name: &str,
        display_name: Option<&str>,
        definition: &DialogueDefinition,
    ) -> Result<()> {
        let action = definition
            .get(action_name)
            .ok_or_else(|| BotError::ActionNotFound(action_name.to_string()))?;
        let name = self.config.name_for(display_name);

        let standalone;
        let steps: &[Step] = match action {
            Action::Script(steps) => steps,
            Action::Menu(menu) => {
                standalone = [Step {
                    delay: Some(self.config.menu_delay),
                    content: StepContent::Menu(menu.clone()),
                }];
                &standalone
            }
        };

        for (index, step) in steps.iter().enumerate() {
            if let Some(delay) = step.delay {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = self.bot.send_typing(conversation).await {
                warn!(error = %e, step = index, "typing indicator failed");
            }
            let text = match &step.content {
                StepContent::Text(text) => personalize(text, &name),
                StepContent::Menu(menu) => personalize(&menu.render(), &name),
            };
            self.bot.send_message(conversation, &text).await?;
        }

        let next = if action.trailing_menu().is_some() {
            action_name
        } else {
            definition.welcome()
        };
        self.sessions.set(&conversation.id, next);
        info!(action = %action_name, steps = steps.len(), session = %next, "action executed");
        Ok(())
    }
}
