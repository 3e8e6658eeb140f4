//! Shared test utilities for integration tests.
//!
//! `MockServer` stands in for the WebSocket endpoint: it records every frame
//! the client writes and lets tests push inbound frames or read failures.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sea_core::error::{SeaError, SeaResult};
use sea_stream::{
    ClientOptions, Dialer, FrameSink, FrameSource, ReadError, StreamClient, Transport,
};
use serde_json::Value;
use tokio::sync::mpsc;

type Inbound = mpsc::UnboundedSender<Result<String, ReadError>>;

#[derive(Default)]
struct MockState {
    dial_attempts: AtomicU32,
    /// Number of dials that fail before one succeeds.
    failing_dials: AtomicU32,
    /// Number of dials that never complete.
    hanging_dials: AtomicU32,
    sent: Mutex<Vec<String>>,
    send_attempts: AtomicUsize,
    inbound: Mutex<Option<Inbound>>,
    close_frames: AtomicUsize,
    shutdowns: AtomicUsize,
    fail_close: AtomicBool,
    /// Sends that succeed before every further send fails.
    sends_before_failure: AtomicUsize,
    fail_sends: AtomicBool,
}

/// In-memory stand-in for the stream endpoint.
#[derive(Clone, Default)]
pub struct MockServer {
    state: Arc<MockState>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A server whose first `count` dials are refused.
    pub fn refusing(count: u32) -> Self {
        let server = Self::new();
        server.state.failing_dials.store(count, Ordering::SeqCst);
        server
    }

    /// A server whose first `count` dials never return.
    pub fn hanging(count: u32) -> Self {
        let server = Self::new();
        server.state.hanging_dials.store(count, Ordering::SeqCst);
        server
    }

    /// Make every close frame fail to send.
    pub fn fail_close_frames(&self) {
        self.state.fail_close.store(true, Ordering::SeqCst);
    }

    /// Let `count` more sends through, then fail every send after them.
    pub fn fail_sends_after(&self, count: usize) {
        self.state
            .sends_before_failure
            .store(count, Ordering::SeqCst);
        self.state.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn dial_attempts(&self) -> u32 {
        self.state.dial_attempts.load(Ordering::SeqCst)
    }

    /// Text sends tried so far, failed ones included.
    pub fn send_attempts(&self) -> usize {
        self.state.send_attempts.load(Ordering::SeqCst)
    }

    pub fn close_frames(&self) -> usize {
        self.state.close_frames.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.state.shutdowns.load(Ordering::SeqCst)
    }

    /// Every text frame written so far, in order.
    pub fn sent(&self) -> Vec<String> {
        self.state.sent.lock().unwrap().clone()
    }

    /// Written frames with the given event name, parsed.
    pub fn sent_events(&self, event: &str) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str::<Value>(text).unwrap())
            .filter(|frame| frame["event"] == event)
            .collect()
    }

    pub fn clear_sent(&self) {
        self.state.sent.lock().unwrap().clear();
    }

    /// Deliver a text frame to the client's read loop.
    pub fn push(&self, text: impl Into<String>) {
        let inbound = self.state.inbound.lock().unwrap();
        inbound
            .as_ref()
            .expect("no connection to push to")
            .send(Ok(text.into()))
            .unwrap();
    }

    /// Deliver a JSON envelope to the client's read loop.
    pub fn push_json(&self, frame: Value) {
        self.push(frame.to_string());
    }

    /// Make the client's next read fail.
    pub fn push_error(&self, error: ReadError) {
        let inbound = self.state.inbound.lock().unwrap();
        inbound
            .as_ref()
            .expect("no connection to push to")
            .send(Err(error))
            .unwrap();
    }

    /// Dialer handle to pass to the client.
    pub fn dialer(&self) -> Arc<dyn Dialer> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Dialer for MockServer {
    async fn dial(&self, _url: &str) -> SeaResult<Transport> {
        let attempt = self.state.dial_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.state.hanging_dials.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if attempt <= self.state.failing_dials.load(Ordering::SeqCst) {
            return Err(SeaError::Socket("connection refused".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.state.inbound.lock().unwrap() = Some(tx);
        Ok(Transport {
            sink: Box::new(MockSink {
                state: self.state.clone(),
            }),
            source: Box::new(MockSource { rx }),
        })
    }
}

struct MockSink {
    state: Arc<MockState>,
}

#[async_trait]
impl FrameSink for MockSink {
    async fn send_text(&mut self, text: String) -> SeaResult<()> {
        self.state.send_attempts.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_sends.load(Ordering::SeqCst) {
            let remaining = self.state.sends_before_failure.load(Ordering::SeqCst);
            if remaining == 0 {
                return Err(SeaError::Socket("broken pipe".into()));
            }
            self.state
                .sends_before_failure
                .store(remaining - 1, Ordering::SeqCst);
        }
        self.state.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn send_close(&mut self) -> SeaResult<()> {
        self.state.close_frames.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(SeaError::Socket("close frame rejected".into()));
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> SeaResult<()> {
        self.state.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockSource {
    rx: mpsc::UnboundedReceiver<Result<String, ReadError>>,
}

#[async_trait]
impl FrameSource for MockSource {
    async fn recv(&mut self) -> Result<String, ReadError> {
        self.rx.recv().await.unwrap_or(Err(ReadError::Eof))
    }
}

/// Options with intervals short enough for tests.
pub fn fast_options() -> ClientOptions {
    ClientOptions::new("test-token")
        .with_heartbeat_interval(Duration::from_millis(40))
        .with_retry_interval(Duration::from_millis(20))
        .with_max_retries(3)
}

/// Options whose heartbeat never fires during a test.
pub fn quiet_options() -> ClientOptions {
    fast_options().with_heartbeat_interval(Duration::from_secs(3600))
}

/// A client wired to a fresh mock server.
pub fn create_test_client(options: ClientOptions) -> (StreamClient, MockServer) {
    let server = MockServer::new();
    let client = StreamClient::with_dialer(options, server.dialer());
    (client, server)
}

/// A connected client wired to a fresh mock server.
pub async fn connected_client(options: ClientOptions) -> (StreamClient, MockServer) {
    let (client, server) = create_test_client(options);
    client.connect().await.expect("mock connect should succeed");
    (client, server)
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// A business event envelope for `collection:<slug>`.
pub fn event_frame(slug: &str, event: &str, payload: Value) -> Value {
    serde_json::json!({
        "topic": format!("collection:{slug}"),
        "event": event,
        "ref": null,
        "payload": payload,
    })
}
