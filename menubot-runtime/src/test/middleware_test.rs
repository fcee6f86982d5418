//! ConversationFilter and LoggingMiddleware.

use menubot_core::{Conversation, ConversationKind, HandlerResponse, InboundMessage, Middleware};

use crate::{ConversationFilter, LoggingMiddleware};

fn sample_message(kind: ConversationKind, text: &str) -> InboundMessage {
    InboundMessage::new(
        "msg-1",
        Conversation {
            id: "5511999".to_string(),
            kind,
        },
        Some("Maria".to_string()),
        text,
    )
}

#[tokio::test]
async fn test_filter_passes_individual_messages() {
    let msg = sample_message(ConversationKind::Individual, "oi");
    assert!(ConversationFilter.before(&msg).await.unwrap());
}

#[tokio::test]
async fn test_filter_stops_own_messages() {
    let mut msg = sample_message(ConversationKind::Individual, "oi");
    msg.from_me = true;
    assert!(!ConversationFilter.before(&msg).await.unwrap());
}

#[tokio::test]
async fn test_filter_stops_group_and_other_conversations() {
    for kind in [ConversationKind::Group, ConversationKind::Other] {
        let msg = sample_message(kind, "menu");
        assert!(!ConversationFilter.before(&msg).await.unwrap());
    }
}

#[tokio::test]
async fn test_logging_middleware_continues() {
    let msg = sample_message(ConversationKind::Individual, "hello");
    assert!(LoggingMiddleware.before(&msg).await.unwrap());
    let response = HandlerResponse::Dispatched("boasVindas".to_string());
    assert!(LoggingMiddleware.after(&msg, &response).await.is_ok());
}
