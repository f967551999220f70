//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Covers: before/after order, before stopping the chain, Stop and Reply ending the handle phase
//! and being passed to after, and errors propagating out of the chain.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use handler_chain::HandlerChain;
use hooty_core::{Chat, Handler, HandlerResponse, HootyError, Message, User};

fn create_test_message(content: &str) -> Message {
    Message {
        id: "42".to_string(),
        content: content.to_string(),
        user: User {
            id: 123,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        created_at: Utc::now(),
    }
}

/// **Test: Empty chain returns Continue.**
#[tokio::test]
async fn test_empty_chain_continues() {
    let chain = HandlerChain::new();
    assert!(chain.is_empty());

    let result = chain.handle(&create_test_message("hi")).await.unwrap();
    assert_eq!(result, HandlerResponse::Continue);
}

/// **Test: Handler before and after run; handle runs once.**
///
/// **Setup:** One handler (counts before/after), one handler (counts handle).
/// **Expected:** before_count=1, handle_count=1, after_count=1; response is Continue.
#[tokio::test]
async fn test_handler_chain_with_handler() {
    let before_count = Arc::new(AtomicUsize::new(0));
    let after_count = Arc::new(AtomicUsize::new(0));
    let handle_count = Arc::new(AtomicUsize::new(0));

    let chain = HandlerChain::new()
        .add_handler(Arc::new(TestBeforeAfterHandler::new(
            before_count.clone(),
            after_count.clone(),
        )))
        .add_handler(Arc::new(TestHandler::new(handle_count.clone())));
    assert_eq!(chain.len(), 2);

    let result = chain.handle(&create_test_message("test")).await.unwrap();

    assert_eq!(result, HandlerResponse::Continue);
    assert_eq!(before_count.load(Ordering::SeqCst), 1);
    assert_eq!(handle_count.load(Ordering::SeqCst), 1);
    assert_eq!(after_count.load(Ordering::SeqCst), 1);
}

/// **Test: before returning false stops the chain; handle is not run.**
#[tokio::test]
async fn test_before_false_stops_chain() {
    struct BlockingHandler;

    #[async_trait::async_trait]
    impl Handler for BlockingHandler {
        async fn before(&self, _message: &Message) -> hooty_core::Result<bool> {
            Ok(false)
        }
    }

    let handle_count = Arc::new(AtomicUsize::new(0));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(BlockingHandler))
        .add_handler(Arc::new(TestHandler::new(handle_count.clone())));

    let result = chain.handle(&create_test_message("test")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(handle_count.load(Ordering::SeqCst), 0);
}

/// **Test: Stop from the first handler prevents later handlers from running.**
#[tokio::test]
async fn test_stop_skips_later_handlers() {
    struct StopHandler;

    #[async_trait::async_trait]
    impl Handler for StopHandler {
        async fn handle(&self, _message: &Message) -> hooty_core::Result<HandlerResponse> {
            Ok(HandlerResponse::Stop)
        }
    }

    let handle_count = Arc::new(AtomicUsize::new(0));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(StopHandler))
        .add_handler(Arc::new(TestHandler::new(handle_count.clone())));

    let result = chain.handle(&create_test_message("/hooty owl")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(handle_count.load(Ordering::SeqCst), 0);
}

/// **Test: Reply stops the chain and is passed to after().**
#[tokio::test]
async fn test_reply_stops_chain_and_passes_to_after() {
    struct ReplyHandler;

    #[async_trait::async_trait]
    impl Handler for ReplyHandler {
        async fn handle(&self, _message: &Message) -> hooty_core::Result<HandlerResponse> {
            Ok(HandlerResponse::Reply("usage".to_string()))
        }
    }

    struct CaptureResponseHandler {
        seen: Arc<std::sync::Mutex<Option<HandlerResponse>>>,
    }

    #[async_trait::async_trait]
    impl Handler for CaptureResponseHandler {
        async fn after(
            &self,
            _message: &Message,
            response: &HandlerResponse,
        ) -> hooty_core::Result<()> {
            *self.seen.lock().unwrap() = Some(response.clone());
            Ok(())
        }
    }

    let seen = Arc::new(std::sync::Mutex::new(None));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(CaptureResponseHandler { seen: seen.clone() }))
        .add_handler(Arc::new(ReplyHandler));

    let result = chain.handle(&create_test_message("test")).await.unwrap();

    assert_eq!(result, HandlerResponse::Reply("usage".to_string()));
    assert_eq!(
        *seen.lock().unwrap(),
        Some(HandlerResponse::Reply("usage".to_string()))
    );
}

/// **Test: before runs first→last, after runs last→first.**
#[tokio::test]
async fn test_multiple_handlers_executed_in_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    struct OrderHandler {
        name: String,
        order: Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Handler for OrderHandler {
        async fn before(&self, _message: &Message) -> hooty_core::Result<bool> {
            self.order.lock().unwrap().push(format!("before_{}", self.name));
            Ok(true)
        }

        async fn after(
            &self,
            _message: &Message,
            _response: &HandlerResponse,
        ) -> hooty_core::Result<()> {
            self.order.lock().unwrap().push(format!("after_{}", self.name));
            Ok(())
        }
    }

    let chain = HandlerChain::new()
        .add_handler(Arc::new(OrderHandler {
            name: "first".to_string(),
            order: order.clone(),
        }))
        .add_handler(Arc::new(OrderHandler {
            name: "second".to_string(),
            order: order.clone(),
        }));

    chain.handle(&create_test_message("test")).await.unwrap();

    let executed = order.lock().unwrap();
    assert_eq!(
        *executed,
        vec!["before_first", "before_second", "after_second", "after_first"]
    );
}

/// **Test: An error from handle propagates out of the chain.**
#[tokio::test]
async fn test_handler_error_propagates() {
    struct FailingHandler;

    #[async_trait::async_trait]
    impl Handler for FailingHandler {
        async fn handle(&self, _message: &Message) -> hooty_core::Result<HandlerResponse> {
            Err(HootyError::Bot("send failed".to_string()))
        }
    }

    let chain = HandlerChain::new().add_handler(Arc::new(FailingHandler));
    let err = chain.handle(&create_test_message("test")).await.unwrap_err();

    assert!(matches!(err, HootyError::Bot(ref m) if m == "send failed"));
}

// --- Helpers used by tests ---

struct TestBeforeAfterHandler {
    before_count: Arc<AtomicUsize>,
    after_count: Arc<AtomicUsize>,
}

impl TestBeforeAfterHandler {
    fn new(before_count: Arc<AtomicUsize>, after_count: Arc<AtomicUsize>) -> Self {
        Self {
            before_count,
            after_count,
        }
    }
}

#[async_trait::async_trait]
impl Handler for TestBeforeAfterHandler {
    async fn before(&self, _message: &Message) -> hooty_core::Result<bool> {
        self.before_count.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn after(&self, _message: &Message, _response: &HandlerResponse) -> hooty_core::Result<()> {
        self.after_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct TestHandler {
    handle_count: Arc<AtomicUsize>,
}

impl TestHandler {
    fn new(handle_count: Arc<AtomicUsize>) -> Self {
        Self { handle_count }
    }
}

#[async_trait::async_trait]
impl Handler for TestHandler {
    async fn handle(&self, _message: &Message) -> hooty_core::Result<HandlerResponse> {
        self.handle_count.fetch_add(1, Ordering::SeqCst);
        Ok(HandlerResponse::Continue)
    }
}
