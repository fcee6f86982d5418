//! # menubot-cli
//!
//! Argument parsing, config loading and the operator session for the `menubot` binary.

pub mod cli;
pub mod operator;

pub use cli::{load_config, Cli, Commands, OperatorCommand};
pub use menubot_runtime::BotConfig;
pub use operator::{format_status_event, print_status_events, run_operator_loop, shutdown_signal};
