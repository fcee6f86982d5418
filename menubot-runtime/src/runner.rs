//! Dispatch loop: consumes [`TransportEvent`]s from one running transport.
//!
//! Inbound messages go to a per-conversation queue; each queue is drained by its own task, so a
//! conversation's messages are processed one at a time while different conversations run in
//! parallel. Other events update the status and are forwarded to the host.
//!
//! A conversation with nothing queued or running for `idle_timeout` loses its queue; its task ends
//! and the next message starts a fresh one.
//!
//! The loop ends on shutdown signal, on a closed event channel, on disconnect, or on auth failure.
//! Before returning it drops every queue and waits for in-flight executions to finish.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use handler_chain::HandlerChain;
use menubot_core::{InboundMessage, Transport, TransportEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::events::{EventBus, StatusEvent};
use crate::lifecycle::{BotStatus, Lifecycle};

pub const DEFAULT_WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Sender side of one conversation's queue. `pending` counts messages queued or being handled.
struct ConversationQueue {
    tx: mpsc::UnboundedSender<InboundMessage>,
    pending: Arc<AtomicUsize>,
    last_used: Instant,
}

/// Handle to a spawned dispatch loop.
pub struct DispatchHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl DispatchHandle {
    /// Asks the loop to stop (no-op if it already ended) and waits for it to drain.
    pub async fn finish(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.join.await {
            error!(error = %e, "dispatch loop task failed");
        }
    }

    pub fn abort(&self) {
        self.join.abort();
    }
}

pub struct DispatchLoop {
    chain: HandlerChain,
    transport: Arc<dyn Transport>,
    lifecycle: Arc<Lifecycle>,
    events: EventBus,
    queues: HashMap<String, ConversationQueue>,
    workers: JoinSet<()>,
    idle_timeout: Duration,
}

enum Flow {
    Continue,
    Exit,
}

impl DispatchLoop {
    pub fn new(
        chain: HandlerChain,
        transport: Arc<dyn Transport>,
        lifecycle: Arc<Lifecycle>,
        events: EventBus,
    ) -> Self {
        Self {
            chain,
            transport,
            lifecycle,
            events,
            queues: HashMap::new(),
            workers: JoinSet::new(),
            idle_timeout: DEFAULT_WORKER_IDLE_TIMEOUT,
        }
    }

    /// Also the reaping period; clamped to at least one millisecond.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout.max(Duration::from_millis(1));
        self
    }

    /// Spawns the loop on `rx`.
    pub fn spawn(self, rx: mpsc::UnboundedReceiver<TransportEvent>) -> DispatchHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(self.run(rx, shutdown_rx));
        DispatchHandle {
            shutdown: Some(shutdown_tx),
            join,
        }
    }

    #[instrument(skip_all)]
    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<TransportEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        info!("dispatch loop started");
        let mut reap = tokio::time::interval(self.idle_timeout);
        reap.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("dispatch loop shutdown requested");
                    break;
                }
                event = rx.recv() => match event {
                    Some(event) => {
                        if let Flow::Exit = self.on_event(event).await {
                            break;
                        }
                    }
                    None => {
                        debug!("transport event channel closed");
                        break;
                    }
                },
                Some(result) = self.workers.join_next(), if !self.workers.is_empty() => {
                    if let Err(e) = result {
                        error!(error = %e, "conversation task failed");
                    }
                }
                _ = reap.tick() => self.reap_idle(Instant::now()),
            }
        }
        self.drain().await;
        info!("dispatch loop finished");
    }

    async fn on_event(&mut self, event: TransportEvent) -> Flow {
        match event {
            TransportEvent::Inbound(message) => {
                self.route(message);
                Flow::Continue
            }
            TransportEvent::PairingChallenge(payload) => {
                self.events.log("Pairing required: scan the code with the phone.");
                self.events.emit(StatusEvent::PairingChallenge(payload));
                Flow::Continue
            }
            TransportEvent::Authenticated => {
                self.events.emit(StatusEvent::Authenticated);
                self.events.log("Authenticated.");
                Flow::Continue
            }
            TransportEvent::Ready => {
                if self.lifecycle.transition(BotStatus::Starting, BotStatus::Running) {
                    self.events.status(BotStatus::Running);
                    self.events.log("Bot connected and ready.");
                }
                Flow::Continue
            }
            TransportEvent::AuthFailure(reason) => {
                error!(reason = %reason, "transport authentication failed");
                self.events.log(format!("Authentication failed: {}", reason));
                if let Err(e) = self.transport.destroy().await {
                    warn!(error = %e, "transport teardown after auth failure failed");
                }
                self.mark_stopped();
                Flow::Exit
            }
            TransportEvent::Disconnected(reason) => {
                warn!(reason = %reason, "transport disconnected");
                self.events.log(format!("Bot disconnected: {}", reason));
                self.events.emit(StatusEvent::Disconnected(reason));
                self.mark_stopped();
                Flow::Exit
            }
        }
    }

    /// Stopping is owned by the controller; only a live transport is marked stopped here.
    fn mark_stopped(&self) {
        if self
            .lifecycle
            .transition_any(&[BotStatus::Starting, BotStatus::Running], BotStatus::Stopped)
            .is_some()
        {
            self.events.status(BotStatus::Stopped);
        }
    }

    fn route(&mut self, message: InboundMessage) {
        let conversation_id = message.conversation.id.clone();
        let message = match self.queues.get_mut(&conversation_id) {
            Some(queue) => {
                queue.pending.fetch_add(1, Ordering::SeqCst);
                queue.last_used = Instant::now();
                match queue.tx.send(message) {
                    Ok(()) => return,
                    Err(mpsc::error::SendError(message)) => {
                        queue.pending.fetch_sub(1, Ordering::SeqCst);
                        message
                    }
                }
            }
            None => message,
        };
        let queue = self.spawn_worker(conversation_id.clone());
        queue.pending.fetch_add(1, Ordering::SeqCst);
        if queue.tx.send(message).is_err() {
            queue.pending.fetch_sub(1, Ordering::SeqCst);
            error!(conversation = %conversation_id, "conversation queue closed");
        }
        self.queues.insert(conversation_id, queue);
    }

    fn spawn_worker(&mut self, conversation_id: String) -> ConversationQueue {
        let (tx, mut rx) = mpsc::unbounded_channel::<InboundMessage>();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = pending.clone();
        let chain = self.chain.clone();
        let events = self.events.clone();
        self.workers.spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = chain.handle(&message).await {
                    error!(
                        error = %e,
                        conversation = %conversation_id,
                        message_id = %message.id,
                        "Handler chain failed"
                    );
                    events.log(format!(
                        "Failed to answer {}: {}",
                        conversation_id, e
                    ));
                }
                worker_pending.fetch_sub(1, Ordering::SeqCst);
            }
            debug!(conversation = %conversation_id, "conversation task finished");
        });
        ConversationQueue {
            tx,
            pending,
            last_used: Instant::now(),
        }
    }

    /// Drops queues with nothing pending that were last used `idle_timeout` before `now`.
    /// Dropping the sender ends the worker once its (empty) queue is read.
    fn reap_idle(&mut self, now: Instant) {
        let idle_timeout = self.idle_timeout;
        self.queues.retain(|conversation_id, queue| {
            let keep = queue.pending.load(Ordering::SeqCst) > 0
                || now.saturating_duration_since(queue.last_used) < idle_timeout;
            if !keep {
                debug!(conversation = %conversation_id, "dropping idle conversation queue");
            }
            keep
        });
    }

    async fn drain(&mut self) {
        self.queues.clear();
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "conversation task failed");
            }
        }
    }
}
