//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Covers: middleware stopping the chain, Dispatched ending the handler phase, handler before/after
//! order, and middleware after running with the final response.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use handler_chain::HandlerChain;
use menubot_core::{
    Conversation, Handler, HandlerResponse, InboundMessage, Middleware, Result,
};

fn create_test_message(text: &str) -> InboundMessage {
    InboundMessage::new(
        "msg-1",
        Conversation::individual("5511999990000@c.us"),
        Some("Maria Silva".to_string()),
        text,
    )
}

struct CountingHandler {
    handled: Arc<AtomicUsize>,
    response: HandlerResponse,
}

#[async_trait]
impl Handler for CountingHandler {
    async fn handle(&self, _message: &InboundMessage) -> Result<HandlerResponse> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

struct RecordingMiddleware {
    name: &'static str,
    allow: bool,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Middleware for RecordingMiddleware {
    async fn before(&self, _message: &InboundMessage) -> Result<bool> {
        self.log.lock().unwrap().push(format!("before_{}", self.name));
        Ok(self.allow)
    }

    async fn after(&self, _message: &InboundMessage, response: &HandlerResponse) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("after_{}:{:?}", self.name, response));
        Ok(())
    }
}

/// **Test: Middleware before returning false stops the chain; no handler runs.**
#[tokio::test]
async fn test_middleware_stops_chain() {
    let handled = Arc::new(AtomicUsize::new(0));
    let log = Arc::new(Mutex::new(Vec::new()));

    let chain = HandlerChain::new()
        .add_middleware(Arc::new(RecordingMiddleware {
            name: "filter",
            allow: false,
            log: log.clone(),
        }))
        .add_handler(Arc::new(CountingHandler {
            handled: handled.clone(),
            response: HandlerResponse::Continue,
        }));

    let result = chain.handle(&create_test_message("oi")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(handled.load(Ordering::SeqCst), 0);
    assert_eq!(*log.lock().unwrap(), vec!["before_filter".to_string()]);
}

/// **Test: Dispatched ends the handler phase; later handlers are skipped.**
#[tokio::test]
async fn test_dispatched_stops_handler_phase() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let chain = HandlerChain::new()
        .add_handler(Arc::new(CountingHandler {
            handled: first.clone(),
            response: HandlerResponse::Dispatched("boasVindas".to_string()),
        }))
        .add_handler(Arc::new(CountingHandler {
            handled: second.clone(),
            response: HandlerResponse::Continue,
        }));

    let result = chain.handle(&create_test_message("oi")).await.unwrap();

    assert_eq!(result, HandlerResponse::Dispatched("boasVindas".to_string()));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

/// **Test: Middleware before runs in order, after in reverse, and after sees the final response.**
#[tokio::test]
async fn test_middleware_order_and_final_response() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let handled = Arc::new(AtomicUsize::new(0));

    let chain = HandlerChain::new()
        .add_middleware(Arc::new(RecordingMiddleware {
            name: "first",
            allow: true,
            log: log.clone(),
        }))
        .add_middleware(Arc::new(RecordingMiddleware {
            name: "second",
            allow: true,
            log: log.clone(),
        }))
        .add_handler(Arc::new(CountingHandler {
            handled,
            response: HandlerResponse::Continue,
        }));

    let result = chain.handle(&create_test_message("free text")).await.unwrap();

    assert_eq!(result, HandlerResponse::Continue);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before_first".to_string(),
            "before_second".to_string(),
            "after_second:Continue".to_string(),
            "after_first:Continue".to_string(),
        ]
    );
}

/// **Test: Handler before/after run around handle; after runs in reverse order.**
#[tokio::test]
async fn test_handler_before_after_order() {
    struct OrderHandler {
        name: &'static str,
        order: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Handler for OrderHandler {
        async fn before(&self, _message: &InboundMessage) -> Result<bool> {
            self.order.lock().unwrap().push(format!("before_{}", self.name));
            Ok(true)
        }

        async fn after(&self, _message: &InboundMessage, _response: &HandlerResponse) -> Result<()> {
            self.order.lock().unwrap().push(format!("after_{}", self.name));
            Ok(())
        }
    }

    let order = Arc::new(Mutex::new(Vec::new()));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(OrderHandler {
            name: "first",
            order: order.clone(),
        }))
        .add_handler(Arc::new(OrderHandler {
            name: "second",
            order: order.clone(),
        }));

    chain.handle(&create_test_message("1")).await.unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        vec!["before_first", "before_second", "after_second", "after_first"]
    );
}
