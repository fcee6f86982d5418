use dashmap::DashMap;
use std::sync::Arc;

/// Conversation id → current action name.
///
/// Entries are created lazily and never removed; they live as long as the process. Each entry is
/// only written by the task that owns its conversation, so per-key updates never interleave.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, conversation_id: &str) -> Option<String> {
        self.sessions.get(conversation_id).map(|s| s.value().clone())
    }

    /// Current action, or `welcome` for a conversation not seen before.
    pub fn current_or(&self, conversation_id: &str, welcome: &str) -> String {
        self.get(conversation_id)
            .unwrap_or_else(|| welcome.to_string())
    }

    pub fn set(&self, conversation_id: &str, action: &str) {
        self.sessions
            .insert(conversation_id.to_string(), action.to_string());
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
