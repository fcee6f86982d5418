//! Operator control surface: start, stop, read and save the definition, shut down.
//!
//! Every lifecycle call first claims the busy guard; a call that finds it taken is dropped with
//! [`Transition::Ignored`]. Saving a definition validates it, stops the transport, waits for the
//! dispatch loop to drain, persists and swaps the definition, then starts again, so no message is
//! ever dispatched while the swap happens.

use std::sync::Arc;
use std::time::Duration;

use dialogue::{DefinitionHandle, DefinitionStore, LoadedDefinition, SessionStore};
use handler_chain::HandlerChain;
use menubot_core::{Result, Transport};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::components::build_bot_components;
use crate::config::BotConfig;
use crate::events::{EventBus, StatusEvent};
use crate::lifecycle::{BotStatus, Lifecycle, Transition};
use crate::runner::{DispatchHandle, DispatchLoop};

pub struct BotController {
    transport: Arc<dyn Transport>,
    store: DefinitionStore,
    definitions: DefinitionHandle,
    sessions: SessionStore,
    chain: HandlerChain,
    lifecycle: Arc<Lifecycle>,
    events: EventBus,
    dispatch: Mutex<Option<DispatchHandle>>,
    shutdown_timeout: Duration,
}

impl BotController {
    /// Builds the engine around `transport` with an already loaded definition. Starts stopped.
    pub fn new(config: &BotConfig, transport: Arc<dyn Transport>, loaded: LoadedDefinition) -> Self {
        let components = build_bot_components(config, transport.bot(), loaded.definition);
        Self {
            transport,
            store: config.definition_store(),
            definitions: components.definitions,
            sessions: components.sessions,
            chain: components.handler_chain,
            lifecycle: Arc::new(Lifecycle::new()),
            events: EventBus::new(),
            dispatch: Mutex::new(None),
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    pub fn status(&self) -> BotStatus {
        self.lifecycle.status()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn definitions(&self) -> &DefinitionHandle {
        &self.definitions
    }

    /// Current durable definition text, exactly as stored.
    pub fn get_definition(&self) -> Result<String> {
        self.store.read_text()
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Transition {
        let Some(_busy) = self.lifecycle.try_busy() else {
            debug!("start ignored: lifecycle busy");
            return Transition::Ignored;
        };
        self.start_inner().await
    }

    #[instrument(skip(self))]
    pub async fn stop(&self) -> Transition {
        let Some(_busy) = self.lifecycle.try_busy() else {
            debug!("stop ignored: lifecycle busy");
            return Transition::Ignored;
        };
        self.stop_inner().await
    }

    /// Validates, then stop → persist + swap → start. An invalid document returns the error with no
    /// side effect at all.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn save_definition(&self, text: &str) -> Result<Transition> {
        let definition = self.store.validate(text)?;
        let Some(_busy) = self.lifecycle.try_busy() else {
            debug!("save ignored: lifecycle busy");
            return Ok(Transition::Ignored);
        };

        self.events.log("Definition saved, restarting the bot...");
        self.stop_inner().await;

        if let Err(e) = self.store.persist(text) {
            error!(error = %e, "failed to persist definition");
            self.events.log(format!("Could not write the definition: {}", e));
            self.start_inner().await;
            return Err(e);
        }
        for (action, key, target) in definition.dangling_targets() {
            warn!(action = %action, key = %key, target = %target, "menu option points to a missing action");
        }
        self.definitions.replace(definition);
        info!(path = %self.store.path().display(), "definition replaced");

        self.start_inner().await;
        Ok(Transition::Applied)
    }

    /// Stops regardless of the busy guard, bounded by the shutdown timeout. Used on process exit.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        match tokio::time::timeout(self.shutdown_timeout, self.stop_inner()).await {
            Ok(_) => info!("shutdown complete"),
            Err(_) => {
                warn!(timeout = ?self.shutdown_timeout, "shutdown timed out; abandoning dispatch loop");
                if let Some(handle) = self.dispatch.lock().await.take() {
                    handle.abort();
                }
                self.lifecycle.force(BotStatus::Stopped);
                self.events.status(BotStatus::Stopped);
            }
        }
    }

    async fn start_inner(&self) -> Transition {
        if !self.lifecycle.transition(BotStatus::Stopped, BotStatus::Starting) {
            debug!(status = %self.lifecycle.status(), "start ignored: not stopped");
            return Transition::Ignored;
        }
        self.events.status(BotStatus::Starting);
        self.events.log("Starting the messaging client...");

        // A loop that ended on its own (disconnect, auth failure) is still draining here.
        if let Some(previous) = self.dispatch.lock().await.take() {
            previous.finish().await;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = DispatchLoop::new(
            self.chain.clone(),
            self.transport.clone(),
            self.lifecycle.clone(),
            self.events.clone(),
        )
        .spawn(rx);
        *self.dispatch.lock().await = Some(handle);

        if let Err(e) = self.transport.initialize(tx).await {
            error!(error = %e, "transport initialize failed");
            self.events.log(format!("Failed to start: {}", e));
            if let Err(e) = self.transport.destroy().await {
                warn!(error = %e, "transport cleanup after failed start");
            }
            if let Some(handle) = self.dispatch.lock().await.take() {
                handle.finish().await;
            }
            self.lifecycle.force(BotStatus::Stopped);
            self.events.status(BotStatus::Stopped);
            return Transition::Failed;
        }
        Transition::Applied
    }

    async fn stop_inner(&self) -> Transition {
        if self
            .lifecycle
            .transition_any(&[BotStatus::Starting, BotStatus::Running], BotStatus::Stopping)
            .is_none()
        {
            debug!(status = %self.lifecycle.status(), "stop ignored: not running");
            return Transition::Ignored;
        }
        self.events.status(BotStatus::Stopping);
        self.events.log("Disconnecting the bot...");

        match tokio::time::timeout(self.shutdown_timeout, self.transport.destroy()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "transport destroy failed; treating as stopped");
                self.events.log(format!("Error while stopping: {}", e));
            }
            Err(_) => {
                warn!(timeout = ?self.shutdown_timeout, "transport destroy timed out; treating as stopped");
                self.events.log("Stopping timed out; treating the bot as stopped.");
            }
        }

        if let Some(handle) = self.dispatch.lock().await.take() {
            handle.finish().await;
        }

        self.lifecycle.force(BotStatus::Stopped);
        self.events.status(BotStatus::Stopped);
        self.events.log("Bot stopped.");
        Transition::Applied
    }
}
