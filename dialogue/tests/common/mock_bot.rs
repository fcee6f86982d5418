//! Mock implementation of [`menubot_core::Bot`] for integration tests.
//!
//! Records every sent message so tests can assert on text and order without a real transport.
//! Can be told to fail the N-th send or every typing indicator.

use async_trait::async_trait;
use menubot_core::{Bot, BotError, Conversation, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded call to `send_message(conversation, text)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub conversation_id: String,
    pub text: String,
}

#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<SentRecord>>,
    typing: AtomicUsize,
    send_attempts: AtomicUsize,
    /// 1-based index of the send call that fails; 0 = never.
    fail_on_send: AtomicUsize,
    fail_typing: AtomicBool,
}

impl MockBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on_send(n: usize) -> Arc<Self> {
        let bot = Self::default();
        bot.fail_on_send.store(n, Ordering::SeqCst);
        Arc::new(bot)
    }

    pub fn failing_typing() -> Arc<Self> {
        let bot = Self::default();
        bot.fail_typing.store(true, Ordering::SeqCst);
        Arc::new(bot)
    }

    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.text).collect()
    }

    pub fn typing_count(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, conversation: &Conversation, text: &str) -> Result<()> {
        let attempt = self.send_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on_send.load(Ordering::SeqCst) {
            return Err(BotError::Transport("send rejected".to_string()));
        }
        self.sent.lock().unwrap().push(SentRecord {
            conversation_id: conversation.id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_typing(&self, _conversation: &Conversation) -> Result<()> {
        self.typing.fetch_add(1, Ordering::SeqCst);
        if self.fail_typing.load(Ordering::SeqCst) {
            return Err(BotError::Transport("typing unavailable".to_string()));
        }
        Ok(())
    }
}
