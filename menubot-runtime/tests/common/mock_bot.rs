//! Recording [`menubot_core::Bot`] for runtime tests.

use async_trait::async_trait;
use menubot_core::{Bot, Conversation, Result};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<(String, String)>>,
}

impl MockBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `(conversation_id, text)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, conversation: &Conversation, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((conversation.id.clone(), text.to_string()));
        Ok(())
    }

    async fn send_typing(&self, _conversation: &Conversation) -> Result<()> {
        Ok(())
    }
}
