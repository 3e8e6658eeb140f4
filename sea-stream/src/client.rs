//! Stream connection manager.
//!
//! Owns the single socket of a client, dials it with bounded retry, and
//! supervises the background tasks that run for each connection:
//! - the heartbeat loop ([`crate::heartbeat`])
//! - the read loop ([`crate::reader`])
//! - the dispatch worker, in [`DispatchMode::Queued`]
//!
//! One mutex guards the connection link, the handler table and the topic
//! list. Every socket write happens while holding it. The read half of the
//! socket belongs to the read loop alone, so reads never hold the lock.
//!
//! Reconnection is never automatic: when the read loop loses the socket the
//! client goes to [`ConnectionState::Disconnected`] and stays there until the
//! caller runs [`StreamClient::connect`] again.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use sea_core::error::{SeaError, SeaResult};

use crate::events::{ConnectionState, EventType};
use crate::handlers::{self, DispatchMode, Dispatcher, EventHandler, HandlerTable};
use crate::options::ClientOptions;
use crate::protocol::{ControlFrame, Message};
use crate::transport::{Dialer, FrameSink, Transport, WsDialer};
use crate::{heartbeat, reader};

/// The connection as seen by everything that shares it.
pub(crate) enum Link {
    Disconnected,
    Connecting,
    Connected {
        /// Identifies the connection the background tasks were started for.
        epoch: u64,
        sink: Box<dyn FrameSink>,
    },
}

impl Link {
    fn state(&self) -> ConnectionState {
        match self {
            Self::Disconnected => ConnectionState::Disconnected,
            Self::Connecting => ConnectionState::Connecting,
            Self::Connected { .. } => ConnectionState::Connected,
        }
    }
}

/// State guarded by the client mutex.
pub(crate) struct Session {
    pub(crate) link: Link,
    pub(crate) handlers: HandlerTable,
    /// Collections the heartbeat covers, in subscription order.
    pub(crate) topics: Vec<String>,
    last_epoch: u64,
    /// Identifies the dial that put the link in `Connecting`.
    dial_seq: u64,
}

impl Session {
    /// Whether the link is up and still belongs to connection `epoch`.
    pub(crate) fn is_live(&self, epoch: u64) -> bool {
        matches!(self.link, Link::Connected { epoch: current, .. } if current == epoch)
    }

    /// Write one control frame on the live link.
    pub(crate) async fn send(&mut self, frame: &ControlFrame) -> SeaResult<()> {
        let text = frame.to_json()?;
        match &mut self.link {
            Link::Connected { sink, .. } => sink.send_text(text).await,
            _ => Err(SeaError::NotConnected),
        }
    }
}

/// Handles of the background tasks of one connection.
#[derive(Default)]
struct SessionTasks {
    heartbeat: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SessionTasks {
    fn abort_all(&mut self) {
        for handle in [
            self.heartbeat.take(),
            self.reader.take(),
            self.worker.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

pub(crate) struct Inner {
    pub(crate) options: ClientOptions,
    dialer: Arc<dyn Dialer>,
    pub(crate) session: Mutex<Session>,
    state_tx: watch::Sender<ConnectionState>,
    tasks: Mutex<SessionTasks>,
}

impl Inner {
    /// Replace the link and publish the new state.
    fn set_link(&self, session: &mut Session, link: Link) -> Link {
        let old = std::mem::replace(&mut session.link, link);
        let (from, to) = (old.state(), session.link.state());
        if from != to {
            info!("stream state: {from} -> {to}");
            self.state_tx.send_replace(to);
        }
        old
    }

    /// Give up dial `seq`, unless a close or a newer dial already took over
    /// the link.
    fn abandon_dial(&self, session: &mut Session, seq: u64) -> bool {
        if matches!(session.link, Link::Connecting) && session.dial_seq == seq {
            self.set_link(session, Link::Disconnected);
            true
        } else {
            false
        }
    }

    /// Record that connection `epoch` lost its socket.
    ///
    /// Stops the heartbeat of that connection. Does nothing if a newer
    /// connection has replaced it in the meantime.
    pub(crate) async fn mark_lost(&self, epoch: u64) {
        let mut session = self.session.lock().await;
        if !session.is_live(epoch) {
            debug!("connection {epoch} already replaced");
            return;
        }
        self.set_link(&mut session, Link::Disconnected);
        if let Some(handle) = self.tasks.lock().await.heartbeat.take() {
            handle.abort();
        }
    }

    /// Publish a freshly dialed transport and start its background tasks.
    async fn install(self: &Arc<Self>, transport: Transport) -> SeaResult<()> {
        let Transport { sink, source } = transport;
        let mut session = self.session.lock().await;
        if !matches!(session.link, Link::Connecting) {
            drop(session);
            let mut sink = sink;
            let _ = sink.shutdown().await;
            warn!("connect was cancelled by close, dropping new socket");
            return Err(SeaError::NotConnected);
        }

        let mut tasks = self.tasks.lock().await;
        session.last_epoch += 1;
        let epoch = session.last_epoch;
        self.set_link(&mut session, Link::Connected { epoch, sink });

        let (dispatcher, worker) = match self.options.dispatch {
            DispatchMode::Inline => (Dispatcher::Inline, None),
            DispatchMode::Queued { capacity } => {
                let (tx, rx) = mpsc::channel(capacity);
                (
                    Dispatcher::Queued(tx),
                    Some(tokio::spawn(handlers::run_worker(rx))),
                )
            }
        };

        *tasks = SessionTasks {
            heartbeat: Some(tokio::spawn(heartbeat::run(self.clone(), epoch))),
            reader: Some(tokio::spawn(reader::run(
                self.clone(),
                epoch,
                source,
                dispatcher,
            ))),
            worker,
        };
        Ok(())
    }
}

/// Client for the collection event stream.
///
/// Cloning is cheap; clones share the same connection and handlers.
///
/// # Handler contract
///
/// In the default [`DispatchMode::Inline`] handlers run on the read loop, one
/// at a time, in the order frames arrived. A slow handler delays every event
/// behind it. A panicking handler ends the read loop.
#[derive(Clone)]
pub struct StreamClient {
    pub(crate) inner: Arc<Inner>,
}

impl StreamClient {
    /// Create a client that dials real WebSocket connections.
    pub fn new(options: ClientOptions) -> Self {
        Self::with_dialer(options, Arc::new(WsDialer))
    }

    /// Create a client with a custom transport.
    pub fn with_dialer(options: ClientOptions, dialer: Arc<dyn Dialer>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let session = Session {
            link: Link::Disconnected,
            handlers: HandlerTable::new(),
            topics: options.topics.clone(),
            last_epoch: 0,
            dial_seq: 0,
        };

        Self {
            inner: Arc::new(Inner {
                options,
                dialer,
                session: Mutex::new(session),
                state_tx,
                tasks: Mutex::new(SessionTasks::default()),
            }),
        }
    }

    /// Options the client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.inner.session.lock().await.link.state()
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Subscribe to connection state changes.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Collections currently covered by the heartbeat.
    pub async fn topics(&self) -> Vec<String> {
        self.inner.session.lock().await.topics.clone()
    }

    /// Open the socket.
    ///
    /// Any connection held before is closed first. Dial attempts are spaced
    /// one retry interval apart; after `max_retries` failures the last error
    /// is returned and the client stays disconnected. On success the heartbeat
    /// and read loops are started and this returns without waiting for them.
    pub async fn connect(&self) -> SeaResult<()> {
        let options = &self.inner.options;
        options.validate()?;

        let guard = self.release_for_dial().await?;

        let url = options.socket_url();
        info!(
            "stream connecting to {} (max retries: {})",
            options.network, options.max_retries
        );

        let mut ticker = interval(options.retry_interval);
        ticker.tick().await;

        let mut attempts = 0u32;
        let transport = loop {
            match self.inner.dialer.dial(&url).await {
                Ok(transport) => break transport,
                Err(e) => {
                    attempts += 1;
                    if attempts >= options.max_retries {
                        error!("connect failed after {attempts} retries: {e}");
                        let mut session = self.inner.session.lock().await;
                        self.inner.abandon_dial(&mut session, guard.seq);
                        guard.disarm();
                        return Err(SeaError::ConnectFailed {
                            attempts,
                            reason: e.to_string(),
                        });
                    }
                    warn!(
                        "connect attempt {attempts} failed: {e}, retrying in {:?}",
                        options.retry_interval
                    );
                    ticker.tick().await;
                }
            }
        };

        let installed = self.inner.install(transport).await;
        guard.disarm();
        installed?;
        info!("stream connected after {} attempt(s)", attempts + 1);
        Ok(())
    }

    /// Claim the link for dialing, tearing down the previous connection.
    ///
    /// The returned guard hands the link back if `connect` is dropped before
    /// it finishes.
    async fn release_for_dial(&self) -> SeaResult<DialGuard> {
        let (old, guard) = {
            let mut session = self.inner.session.lock().await;
            if matches!(session.link, Link::Connecting) {
                debug!("already connecting, rejecting concurrent connect");
                return Err(SeaError::ConnectInProgress);
            }
            self.inner.tasks.lock().await.abort_all();
            session.dial_seq += 1;
            let guard = DialGuard {
                inner: self.inner.clone(),
                seq: session.dial_seq,
                armed: true,
            };
            (self.inner.set_link(&mut session, Link::Connecting), guard)
        };

        if let Link::Connected { mut sink, .. } = old {
            debug!("closing previous connection before dialing");
            close_sink(sink.as_mut()).await;
        }
        Ok(guard)
    }

    /// Close the socket and stop the background tasks.
    ///
    /// The close frame is best effort. Closing a client that is not connected
    /// is a no-op.
    pub async fn close(&self) -> SeaResult<()> {
        let old = {
            let mut session = self.inner.session.lock().await;
            self.inner.tasks.lock().await.abort_all();
            self.inner.set_link(&mut session, Link::Disconnected)
        };

        match old {
            Link::Connected { mut sink, .. } => {
                if let Err(e) = sink.send_close().await {
                    warn!("error sending close frame: {e}");
                }
                sink.shutdown().await?;
                info!("stream closed");
                Ok(())
            }
            _ => {
                info!("stream is not connected");
                Ok(())
            }
        }
    }

    /// Register `handler` for each of `event_types`, replacing any handler
    /// registered before for the same type.
    pub async fn on<F>(&self, event_types: &[EventType], handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        self.inner
            .session
            .lock()
            .await
            .handlers
            .register(event_types, handler);
    }

    /// Remove the handlers of `event_types`.
    pub async fn off(&self, event_types: &[EventType]) {
        self.inner.session.lock().await.handlers.remove(event_types);
    }

    pub async fn on_item_listed<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemListed], handler).await;
    }

    pub async fn on_item_sold<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemSold], handler).await;
    }

    pub async fn on_item_cancelled<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemCancelled], handler).await;
    }

    pub async fn on_item_transferred<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemTransferred], handler).await;
    }

    pub async fn on_item_metadata_updated<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemMetadataUpdated], handler).await;
    }

    pub async fn on_item_received_offer<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemReceivedOffer], handler).await;
    }

    /// Bids are suppressed by the read loop; this handler is never called.
    pub async fn on_item_received_bid<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::ItemReceivedBid], handler).await;
    }

    /// Collection offers are suppressed by the read loop; this handler is never called.
    pub async fn on_collection_offer<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::CollectionOffer], handler).await;
    }

    /// Trait offers are suppressed by the read loop; this handler is never called.
    pub async fn on_trait_offer<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on(&[EventType::TraitOffer], handler).await;
    }
}

/// Resets the link of a dial whose `connect` future was dropped.
struct DialGuard {
    inner: Arc<Inner>,
    seq: u64,
    armed: bool,
}

impl DialGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for DialGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let seq = self.seq;
        if let Ok(mut session) = self.inner.session.try_lock() {
            if self.inner.abandon_dial(&mut session, seq) {
                info!("connect cancelled while dialing");
            }
            return;
        }

        // The lock is busy; finish the reset once it frees up.
        let inner = self.inner.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut session = inner.session.lock().await;
                    if inner.abandon_dial(&mut session, seq) {
                        info!("connect cancelled while dialing");
                    }
                });
            }
            Err(_) => warn!("connect cancelled outside a runtime, link left connecting"),
        }
    }
}

/// Best-effort close of a sink nobody else holds anymore.
async fn close_sink(sink: &mut dyn FrameSink) {
    if let Err(e) = sink.send_close().await {
        warn!("error sending close frame: {e}");
    }
    if let Err(e) = sink.shutdown().await {
        warn!("error closing socket: {e}");
    }
}
