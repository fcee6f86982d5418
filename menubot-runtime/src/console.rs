//! Line-oriented console transport for local runs.
//!
//! Inbound lines are `conversation|name|text`; replies are printed as `[conversation] text`.
//! Conversation ids ending in `@g.us` are treated as groups, so the filter can be exercised too.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use menubot_core::{
    Bot, BotError, Conversation, ConversationKind, EventSender, InboundMessage, Result,
    ToCoreMessage, Transport, TransportEvent,
};
use tracing::{debug, warn};

const GROUP_SUFFIX: &str = "@g.us";

/// One parsed console input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub id: String,
    pub conversation: String,
    pub name: Option<String>,
    pub text: String,
}

impl ConsoleLine {
    /// Parses `conversation|name|text`. Text may itself contain `|`. Returns None without a
    /// conversation id.
    pub fn parse(id: impl Into<String>, line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, '|');
        let conversation = parts.next()?.trim();
        let name = parts.next()?.trim();
        let text = parts.next()?;
        if conversation.is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            conversation: conversation.to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
            text: text.to_string(),
        })
    }
}

impl ToCoreMessage for ConsoleLine {
    fn to_core(&self) -> InboundMessage {
        let kind = if self.conversation.ends_with(GROUP_SUFFIX) {
            ConversationKind::Group
        } else {
            ConversationKind::Individual
        };
        InboundMessage::new(
            self.id.clone(),
            Conversation {
                id: self.conversation.clone(),
                kind,
            },
            self.name.clone(),
            self.text.clone(),
        )
    }
}

/// Prints outbound messages to stdout.
pub struct ConsoleBot;

#[async_trait]
impl Bot for ConsoleBot {
    async fn send_message(&self, conversation: &Conversation, text: &str) -> Result<()> {
        println!("[{}] {}", conversation.id, text);
        Ok(())
    }

    async fn send_typing(&self, conversation: &Conversation) -> Result<()> {
        debug!(conversation = %conversation.id, "typing");
        Ok(())
    }
}

/// Transport backed by lines the host feeds through [`ConsoleTransport::inject`].
pub struct ConsoleTransport {
    events: Mutex<Option<EventSender>>,
    counter: AtomicU64,
    bot: Arc<ConsoleBot>,
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self {
            events: Mutex::new(None),
            counter: AtomicU64::new(0),
            bot: Arc::new(ConsoleBot),
        }
    }
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one input line. Returns false if the line is malformed or the transport is down.
    pub fn inject(&self, line: &str) -> bool {
        let id = format!("console-{}", self.counter.fetch_add(1, Ordering::Relaxed) + 1);
        let Some(parsed) = ConsoleLine::parse(id, line) else {
            warn!(line = %line, "expected conversation|name|text");
            return false;
        };
        self.send(TransportEvent::Inbound(parsed.to_core()))
    }

    pub fn is_connected(&self) -> bool {
        self.events.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    fn send(&self, event: TransportEvent) -> bool {
        let guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        match guard.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => {
                debug!("console transport not initialized; dropping event");
                false
            }
        }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn initialize(&self, events: EventSender) -> Result<()> {
        {
            let mut guard = self
                .events
                .lock()
                .map_err(|_| BotError::Transport("console transport lock poisoned".to_string()))?;
            *guard = Some(events);
        }
        // No pairing on the console.
        self.send(TransportEvent::Authenticated);
        self.send(TransportEvent::Ready);
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| BotError::Transport("console transport lock poisoned".to_string()))?;
        guard.take();
        Ok(())
    }

    fn bot(&self) -> Arc<dyn Bot> {
        self.bot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_parse_line() {
        let line = ConsoleLine::parse("1", "5511999|Maria Silva|oi | tudo bem").unwrap();
        assert_eq!(line.conversation, "5511999");
        assert_eq!(line.name.as_deref(), Some("Maria Silva"));
        assert_eq!(line.text, "oi | tudo bem");
    }

    #[test]
    fn test_parse_line_without_name() {
        let line = ConsoleLine::parse("1", "5511999||1").unwrap();
        assert_eq!(line.name, None);
        assert_eq!(line.text, "1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ConsoleLine::parse("1", "just text").is_none());
        assert!(ConsoleLine::parse("1", "|name|text").is_none());
    }

    #[test]
    fn test_group_suffix_sets_kind() {
        let message = ConsoleLine::parse("1", "123@g.us|Ana|oi").unwrap().to_core();
        assert_eq!(message.conversation.kind, ConversationKind::Group);
        let message = ConsoleLine::parse("1", "123|Ana|oi").unwrap().to_core();
        assert_eq!(message.conversation.kind, ConversationKind::Individual);
    }

    #[tokio::test]
    async fn test_initialize_reports_ready_and_forwards_lines() {
        let transport = ConsoleTransport::new();
        assert!(!transport.inject("a|b|c"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        transport.initialize(tx).await.unwrap();
        assert!(matches!(rx.recv().await, Some(TransportEvent::Authenticated)));
        assert!(matches!(rx.recv().await, Some(TransportEvent::Ready)));

        assert!(transport.inject("5511|Ana|menu"));
        match rx.recv().await {
            Some(TransportEvent::Inbound(message)) => {
                assert_eq!(message.conversation.id, "5511");
                assert_eq!(message.text, "menu");
                assert_eq!(message.id, "console-2");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        transport.destroy().await.unwrap();
        assert!(!transport.is_connected());
        assert!(rx.recv().await.is_none());
    }
}
