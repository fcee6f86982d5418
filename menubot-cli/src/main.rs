//! menubot CLI: run the bot on the console transport, or check a definition document.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use menubot_cli::{
    load_config, print_status_events, run_operator_loop, shutdown_signal, BotConfig, Cli, Commands,
};
use menubot_core::init_tracing;
use menubot_runtime::{BotController, ConsoleTransport};
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { definition } => {
            let config = load_config(definition)?;
            run(config).await
        }
        Commands::Check { definition } => {
            let config = load_config(definition)?;
            check(&config)
        }
    }
}

async fn run(config: BotConfig) -> Result<()> {
    init_tracing(&config.log_file)?;

    let store = config.definition_store();
    let loaded = match store.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(path = %store.path().display(), error = %e, "Cannot load definition");
            eprintln!("Cannot load {}: {}", store.path().display(), e);
            return Err(e.into());
        }
    };
    info!(
        path = %store.path().display(),
        actions = loaded.definition.len(),
        "Definition loaded"
    );

    let transport = Arc::new(ConsoleTransport::new());
    let controller = BotController::new(&config, transport.clone(), loaded);

    tokio::spawn(print_status_events(controller.subscribe()));

    println!("Commands: /start /stop /status /show /save PATH /exit");
    println!("Messages: conversation|name|text");
    controller.start().await;

    let input = BufReader::new(tokio::io::stdin());
    run_operator_loop(&controller, &transport, input, shutdown_signal()).await?;
    Ok(())
}

fn check(config: &BotConfig) -> Result<()> {
    let store = config.definition_store();
    let loaded = store
        .load()
        .with_context(|| format!("Load definition from {}", store.path().display()))?;
    let definition = &loaded.definition;

    println!(
        "{}: {} action(s), welcome action '{}'{}",
        store.path().display(),
        definition.len(),
        definition.welcome(),
        if definition.contains(definition.welcome()) {
            ""
        } else {
            " (missing)"
        }
    );
    for name in definition.action_names() {
        println!("  {}", name);
    }

    let dangling = definition.dangling_targets();
    if dangling.is_empty() {
        println!("All menu options point to existing actions.");
    } else {
        println!("Menu options pointing to missing actions:");
        for (action, key, target) in dangling {
            println!("  {} [{}] -> {}", action, key, target);
        }
    }
    Ok(())
}
