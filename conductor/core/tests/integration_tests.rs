//! Integration tests for the send pipeline
//!
//! These tests drive the Conductor through its public API with an injected
//! backend, the way the terminal surface does. Tests cover:
//! - The request body and the reply that lands in the transcript
//! - Empty and whitespace-only submissions
//! - Reply field precedence and the fallback reply
//! - Failures collapsing into the connection error message
//! - At most one request in flight
//! - The message stream a surface observes

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};

use dream11_conductor::{
    BackendError, ChatBackend, ChatMessage, ChatRequest, Conductor, ConductorConfig,
    ConductorMessage, ConductorState, Origin, SurfaceEvent, CONNECTION_ERROR_REPLY,
    FALLBACK_REPLY, GREETING,
};

// =============================================================================
// Scripted Backend
// =============================================================================

/// Backend that records requests and answers from a script
struct ScriptedBackend {
    outcome: Box<dyn Fn() -> Result<Value, BackendError> + Send + Sync>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    request_count: Arc<AtomicUsize>,
    /// When set, requests block until notified
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    fn replying(body: Value) -> Self {
        Self::with_outcome(move || Ok(body.clone()))
    }

    fn failing(make_error: fn() -> BackendError) -> Self {
        Self::with_outcome(move || Err(make_error()))
    }

    fn with_outcome(
        outcome: impl Fn() -> Result<Value, BackendError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            outcome: Box::new(outcome),
            requests: Arc::new(Mutex::new(Vec::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<Value, BackendError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        (self.outcome)()
    }
}

struct Harness {
    conductor: Conductor<ScriptedBackend>,
    rx: mpsc::Receiver<ConductorMessage>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    request_count: Arc<AtomicUsize>,
}

fn harness(backend: ScriptedBackend, config: ConductorConfig) -> Harness {
    let requests = Arc::clone(&backend.requests);
    let request_count = Arc::clone(&backend.request_count);
    let (tx, rx) = mpsc::channel(100);
    Harness {
        conductor: Conductor::new(backend, config, tx),
        rx,
        requests,
        request_count,
    }
}

async fn send(conductor: &mut Conductor<ScriptedBackend>, text: &str) {
    conductor
        .handle_event(SurfaceEvent::user_message(text))
        .await
        .unwrap();
}

fn drain(rx: &mut mpsc::Receiver<ConductorMessage>) -> Vec<ConductorMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

// =============================================================================
// Test 1: Basic Exchange
// =============================================================================

#[tokio::test]
async fn test_hello_exchange() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "reply": "Hi there!" })),
        ConductorConfig::default(),
    );

    send(&mut h.conductor, "Hello").await;
    assert!(h.conductor.wait_for_reply().await);

    assert_eq!(
        h.conductor.transcript(),
        &[
            ChatMessage::bot(GREETING),
            ChatMessage::user("Hello"),
            ChatMessage::bot("Hi there!"),
        ]
    );
    assert!(!h.conductor.is_reply_pending());

    let requests = h.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        serde_json::to_value(&requests[0]).unwrap(),
        json!({ "message": "Hello" })
    );
}

#[tokio::test]
async fn test_input_is_trimmed_before_sending() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "reply": "ok" })),
        ConductorConfig::default(),
    );

    send(&mut h.conductor, "   where is my refund?\n").await;
    h.conductor.wait_for_reply().await;

    assert_eq!(h.conductor.transcript()[1].text, "where is my refund?");
    assert_eq!(h.requests.lock().unwrap()[0].message, "where is my refund?");
}

#[tokio::test]
async fn test_session_id_sent_when_enabled() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "reply": "ok" })),
        ConductorConfig {
            send_session_id: true,
            ..ConductorConfig::default()
        },
    );

    send(&mut h.conductor, "Hello").await;
    h.conductor.wait_for_reply().await;

    let expected = h.conductor.session_id().as_str().to_string();
    let requests = h.requests.lock().unwrap();
    assert_eq!(requests[0].session_id.as_deref(), Some(expected.as_str()));
}

// =============================================================================
// Test 2: Empty Input
// =============================================================================

#[tokio::test]
async fn test_blank_submissions_are_no_ops() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "reply": "never" })),
        ConductorConfig::default(),
    );

    for text in ["", "   ", "\t\n"] {
        send(&mut h.conductor, text).await;
    }

    assert_eq!(h.conductor.transcript(), &[ChatMessage::bot(GREETING)]);
    assert!(!h.conductor.is_reply_pending());
    assert_eq!(h.request_count.load(Ordering::SeqCst), 0);
    assert!(drain(&mut h.rx).is_empty());
}

// =============================================================================
// Test 3: Reply Extraction
// =============================================================================

async fn reply_for(body: Value) -> String {
    let mut h = harness(ScriptedBackend::replying(body), ConductorConfig::default());
    send(&mut h.conductor, "Hello").await;
    h.conductor.wait_for_reply().await;
    h.conductor.transcript().last().unwrap().text.clone()
}

#[tokio::test]
async fn test_reply_field_precedence() {
    assert_eq!(
        reply_for(json!({ "reply": "A", "message": "B", "response": "C" })).await,
        "A"
    );
    assert_eq!(reply_for(json!({ "message": "B", "response": "C" })).await, "B");
    assert_eq!(reply_for(json!({ "response": "C" })).await, "C");
}

#[tokio::test]
async fn test_fallback_when_no_reply_field() {
    assert_eq!(reply_for(json!({ "status": "ok" })).await, FALLBACK_REPLY);
    assert_eq!(reply_for(json!({ "reply": "" })).await, FALLBACK_REPLY);
    assert_eq!(reply_for(json!(null)).await, FALLBACK_REPLY);
}

// =============================================================================
// Test 4: Failures
// =============================================================================

#[tokio::test]
async fn test_every_failure_shows_connection_error() {
    let failures: [fn() -> BackendError; 3] = [
        || BackendError::Status { status: 500 },
        || BackendError::Transport("connection refused".to_string()),
        || BackendError::Decode("expected value at line 1".to_string()),
    ];

    for make_error in failures {
        let mut h = harness(
            ScriptedBackend::failing(make_error),
            ConductorConfig::default(),
        );
        send(&mut h.conductor, "Hello").await;
        h.conductor.wait_for_reply().await;

        let last = h.conductor.transcript().last().unwrap();
        assert_eq!(last.origin, Origin::Bot);
        assert_eq!(last.text, CONNECTION_ERROR_REPLY);
        assert!(!h.conductor.is_reply_pending());
        assert_eq!(h.conductor.state(), ConductorState::Ready);
    }
}

#[tokio::test]
async fn test_can_send_again_after_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let backend = ScriptedBackend::with_outcome(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(BackendError::Status { status: 502 })
        } else {
            Ok(json!({ "reply": "Back online" }))
        }
    });
    let mut h = harness(backend, ConductorConfig::default());

    send(&mut h.conductor, "first").await;
    h.conductor.wait_for_reply().await;
    send(&mut h.conductor, "second").await;
    h.conductor.wait_for_reply().await;

    let texts: Vec<&str> = h
        .conductor
        .transcript()
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![GREETING, "first", CONNECTION_ERROR_REPLY, "second", "Back online"]
    );
}

// =============================================================================
// Test 5: Single Request In Flight
// =============================================================================

#[tokio::test]
async fn test_only_one_request_in_flight() {
    let gate = Arc::new(Notify::new());
    let backend = ScriptedBackend::replying(json!({ "reply": "done" })).gated(Arc::clone(&gate));
    let mut h = harness(backend, ConductorConfig::default());

    send(&mut h.conductor, "first").await;
    send(&mut h.conductor, "second").await;
    send(&mut h.conductor, "third").await;

    // Reply is still outstanding
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!h.conductor.poll_reply().await);
    assert!(h.conductor.is_reply_pending());
    assert_eq!(h.conductor.transcript().len(), 2);

    gate.notify_one();
    assert!(h.conductor.wait_for_reply().await);

    assert_eq!(h.request_count.load(Ordering::SeqCst), 1);
    assert_eq!(h.conductor.transcript().len(), 3);
    assert!(!h.conductor.is_reply_pending());
}

#[tokio::test]
async fn test_poll_reply_applies_finished_request() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "message": "polled" })),
        ConductorConfig::default(),
    );

    send(&mut h.conductor, "Hello").await;

    let mut applied = false;
    for _ in 0..100 {
        if h.conductor.poll_reply().await {
            applied = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(applied);
    assert_eq!(h.conductor.transcript().last().unwrap().text, "polled");
}

// =============================================================================
// Test 6: Surface Message Stream
// =============================================================================

#[tokio::test]
async fn test_surface_sees_state_and_messages_in_order() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "reply": "Hi there!" })),
        ConductorConfig::default(),
    );

    h.conductor.start().await.unwrap();
    drain(&mut h.rx);

    send(&mut h.conductor, "Hello").await;
    h.conductor.wait_for_reply().await;

    let kinds: Vec<String> = drain(&mut h.rx)
        .into_iter()
        .map(|msg| match msg {
            ConductorMessage::Message { message } => format!("{:?}:{}", message.origin, message.text),
            ConductorMessage::State { state } => format!("state:{state:?}"),
            other => format!("other:{other:?}"),
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "User:Hello".to_string(),
            "state:AwaitingReply".to_string(),
            "Bot:Hi there!".to_string(),
            "state:Ready".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_connected_replays_transcript() {
    let mut h = harness(
        ScriptedBackend::replying(json!({ "reply": "Hi there!" })),
        ConductorConfig::default(),
    );
    h.conductor.start().await.unwrap();
    send(&mut h.conductor, "Hello").await;
    h.conductor.wait_for_reply().await;
    drain(&mut h.rx);

    h.conductor
        .handle_event(SurfaceEvent::Connected {
            event_id: SurfaceEvent::new_event_id(),
        })
        .await
        .unwrap();

    let replayed: Vec<ChatMessage> = drain(&mut h.rx)
        .into_iter()
        .filter_map(|msg| match msg {
            ConductorMessage::Message { message } => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(replayed, h.conductor.transcript().to_vec());
}
