//! CLI parser, config loading and the operator commands read from stdin.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use menubot_runtime::BotConfig;

#[derive(Parser)]
#[command(name = "menubot")]
#[command(about = "Menu-driven auto-responder", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot on the console transport (config from env; --definition overrides DEFINITION_PATH).
    Run {
        #[arg(short, long)]
        definition: Option<PathBuf>,
    },
    /// Validate the definition document and list its actions.
    Check {
        #[arg(short, long)]
        definition: Option<PathBuf>,
    },
}

/// Load BotConfig from environment. If `definition` is provided it overrides DEFINITION_PATH.
pub fn load_config(definition: Option<PathBuf>) -> Result<BotConfig> {
    let config = BotConfig::load(definition)?;
    config.validate()?;
    Ok(config)
}

/// Operator input while the bot runs. Anything that is not a slash command is an inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Stop,
    Status,
    Show,
    Save(PathBuf),
    Exit,
    Inbound(String),
    Unknown(String),
}

impl OperatorCommand {
    /// None for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Self::Inbound(line.to_string()));
        }
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };
        Some(match command {
            "/start" => Self::Start,
            "/stop" => Self::Stop,
            "/status" => Self::Status,
            "/show" => Self::Show,
            "/save" if !arg.is_empty() => Self::Save(PathBuf::from(arg)),
            "/exit" | "/quit" => Self::Exit,
            _ => Self::Unknown(line.to_string()),
        })
    }
}
