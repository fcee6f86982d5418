//! Runtime config, loaded from environment variables.
//!
//! `DEFINITION_PATH`, `LOG_FILE`, `WELCOME_ACTION`, `GREETING_KEYWORDS` (comma separated),
//! `NAME_FALLBACK`, `NAME_STYLE` (`first` | `full`), `MENU_DELAY_MS`, `SHUTDOWN_TIMEOUT_SECS`.

use anyhow::Result;
use dialogue::{
    DefinitionStore, ExecutorConfig, NameStyle, DEFAULT_GREETING_KEYWORDS, DEFAULT_MENU_DELAY,
    DEFAULT_NAME_FALLBACK, DEFAULT_WELCOME_ACTION,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Dialogue definition document.
    pub definition_path: PathBuf,
    pub log_file: String,
    pub welcome_action: String,
    pub greeting_keywords: Vec<String>,
    pub name_fallback: String,
    pub name_style: NameStyle,
    pub menu_delay: Duration,
    /// Upper bound for transport teardown on stop and on exit.
    pub shutdown_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            definition_path: PathBuf::from("mensagens.json"),
            log_file: "logs/menubot.log".to_string(),
            welcome_action: DEFAULT_WELCOME_ACTION.to_string(),
            greeting_keywords: DEFAULT_GREETING_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            name_fallback: DEFAULT_NAME_FALLBACK.to_string(),
            name_style: NameStyle::default(),
            menu_delay: DEFAULT_MENU_DELAY,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl BotConfig {
    /// Loads from environment. `definition_path` overrides `DEFINITION_PATH` if provided.
    pub fn load(definition_path: Option<PathBuf>) -> Result<Self> {
        let defaults = Self::default();

        let definition_path = definition_path
            .or_else(|| env::var("DEFINITION_PATH").ok().map(PathBuf::from))
            .unwrap_or(defaults.definition_path);
        let log_file = env::var("LOG_FILE").unwrap_or(defaults.log_file);
        let welcome_action = env::var("WELCOME_ACTION").unwrap_or(defaults.welcome_action);
        let greeting_keywords = env::var("GREETING_KEYWORDS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.greeting_keywords);
        let name_fallback = env::var("NAME_FALLBACK").unwrap_or(defaults.name_fallback);
        let name_style = match env::var("NAME_STYLE") {
            Ok(s) => s.parse::<NameStyle>()?,
            Err(_) => defaults.name_style,
        };
        let menu_delay = env::var("MENU_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.menu_delay);
        let shutdown_timeout = env::var("SHUTDOWN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.shutdown_timeout);

        Ok(Self {
            definition_path,
            log_file,
            welcome_action,
            greeting_keywords,
            name_fallback,
            name_style,
            menu_delay,
            shutdown_timeout,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.welcome_action.trim().is_empty() {
            anyhow::bail!("WELCOME_ACTION must not be empty");
        }
        if self.greeting_keywords.is_empty() {
            anyhow::bail!("GREETING_KEYWORDS must contain at least one keyword");
        }
        if self.shutdown_timeout.is_zero() {
            anyhow::bail!("SHUTDOWN_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            name_style: self.name_style,
            name_fallback: self.name_fallback.clone(),
            menu_delay: self.menu_delay,
        }
    }

    pub fn definition_store(&self) -> DefinitionStore {
        DefinitionStore::new(self.definition_path.clone(), self.welcome_action.clone())
    }
}
