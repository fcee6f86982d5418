//! Operator session on the console: commands and inbound lines from an input stream, status
//! events printed to stdout, and a bounded shutdown on `/exit`, end of input or a termination signal.

use std::future::Future;

use menubot_runtime::{BotController, ConsoleTransport, StatusEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::cli::OperatorCommand;

pub fn format_status_event(event: &StatusEvent) -> String {
    match event {
        StatusEvent::StatusChanged(status) => format!("* status: {}", status),
        StatusEvent::Log(line) => format!("* {}", line),
        StatusEvent::PairingChallenge(payload) => format!("* pairing code: {}", payload),
        StatusEvent::Authenticated => "* authenticated".to_string(),
        StatusEvent::Disconnected(reason) => format!("* disconnected: {}", reason),
    }
}

/// Prints events until the bus is closed. A lagging receiver skips the lost events and keeps going.
/// Returns how many events were printed.
pub async fn print_status_events(mut events: broadcast::Receiver<StatusEvent>) -> usize {
    let mut printed = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                println!("{}", format_status_event(&event));
                printed += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "status printer fell behind; events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
    printed
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C"),
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler; listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received Ctrl-C");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C");
    }
}

/// Reads operator input until `/exit`, end of input or `shutdown` resolves, then shuts the bot down.
pub async fn run_operator_loop<R, S>(
    controller: &BotController,
    transport: &ConsoleTransport,
    input: R,
    shutdown: S,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Operator input closed");
                    break;
                };
                let Some(command) = OperatorCommand::parse(&line) else {
                    continue;
                };
                if !execute(controller, transport, command).await {
                    break;
                }
            }
        }
    }
    controller.shutdown().await;
    Ok(())
}

/// Returns false on `/exit`.
async fn execute(
    controller: &BotController,
    transport: &ConsoleTransport,
    command: OperatorCommand,
) -> bool {
    match command {
        OperatorCommand::Start => println!("start: {:?}", controller.start().await),
        OperatorCommand::Stop => println!("stop: {:?}", controller.stop().await),
        OperatorCommand::Status => println!("status: {}", controller.status()),
        OperatorCommand::Show => match controller.get_definition() {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Cannot read definition: {}", e),
        },
        OperatorCommand::Save(path) => match std::fs::read_to_string(&path) {
            Ok(text) => match controller.save_definition(&text).await {
                Ok(transition) => println!("save: {:?}", transition),
                Err(e) => eprintln!("Definition rejected: {}", e),
            },
            Err(e) => eprintln!("Cannot read {}: {}", path.display(), e),
        },
        OperatorCommand::Exit => return false,
        OperatorCommand::Inbound(line) => {
            if !transport.inject(&line) {
                eprintln!("Not delivered (bot stopped or line is not conversation|name|text)");
            }
        }
        OperatorCommand::Unknown(line) => eprintln!("Unknown command: {}", line),
    }
    true
}
