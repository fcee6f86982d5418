//! Scripted [`menubot_core::Transport`]: tests push events by hand and can slow down or hang
//! `destroy` to exercise the controller's guards and timeouts.

use async_trait::async_trait;
use menubot_core::{Bot, BotError, EventSender, Result, Transport, TransportEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::mock_bot::MockBot;

#[derive(Clone, Copy)]
pub enum DestroyBehavior {
    Immediate,
    Delay(Duration),
    Hang,
}

pub struct MockTransport {
    events: Mutex<Option<EventSender>>,
    /// Sends Authenticated + Ready from `initialize`.
    auto_ready: bool,
    destroy_behavior: DestroyBehavior,
    fail_initialize: bool,
    initialized: AtomicUsize,
    destroyed: AtomicUsize,
    bot: Arc<MockBot>,
}

impl MockTransport {
    pub fn new(auto_ready: bool, destroy_behavior: DestroyBehavior) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(None),
            auto_ready,
            destroy_behavior,
            fail_initialize: false,
            initialized: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            bot: MockBot::new(),
        })
    }

    pub fn ready() -> Arc<Self> {
        Self::new(true, DestroyBehavior::Immediate)
    }

    /// `initialize` returns an error, as a client that cannot launch would.
    pub fn failing_initialize() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(None),
            auto_ready: false,
            destroy_behavior: DestroyBehavior::Immediate,
            fail_initialize: true,
            initialized: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            bot: MockBot::new(),
        })
    }

    pub fn mock_bot(&self) -> Arc<MockBot> {
        self.bot.clone()
    }

    /// Pushes an event as the live client would. False if not initialized or already destroyed.
    pub fn emit(&self, event: TransportEvent) -> bool {
        match self.events.lock().unwrap().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn initialize_count(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn initialize(&self, events: EventSender) -> Result<()> {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        if self.fail_initialize {
            return Err(BotError::Transport("browser failed to launch".to_string()));
        }
        if self.auto_ready {
            let _ = events.send(TransportEvent::Authenticated);
            let _ = events.send(TransportEvent::Ready);
        }
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        match self.destroy_behavior {
            DestroyBehavior::Immediate => {}
            DestroyBehavior::Delay(d) => tokio::time::sleep(d).await,
            DestroyBehavior::Hang => std::future::pending::<()>().await,
        }
        self.events.lock().unwrap().take();
        Ok(())
    }

    fn bot(&self) -> Arc<dyn Bot> {
        self.bot.clone()
    }
}
