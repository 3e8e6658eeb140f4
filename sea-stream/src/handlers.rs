//! Event handler table and dispatch.
//!
//! At most one handler is registered per event type; registering again for
//! the same type replaces the previous handler.
//!
//! Handlers run on the read loop by default, so a slow handler delays every
//! event behind it. [`DispatchMode::Queued`] moves handler calls onto a
//! dedicated worker fed by a bounded queue; the read loop then only blocks
//! when the queue is full.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::EventType;
use crate::protocol::Message;

/// Callback invoked with each dispatched frame.
pub type EventHandler = Arc<dyn Fn(&Message) + Send + Sync>;

/// How handlers are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Call the handler on the read loop before reading the next frame.
    #[default]
    Inline,
    /// Hand frames to a worker task through a queue of `capacity` entries.
    Queued {
        /// Queue length before the read loop waits.
        capacity: usize,
    },
}

/// Registered handlers keyed by event type.
#[derive(Default, Clone)]
pub struct HandlerTable {
    handlers: HashMap<EventType, EventHandler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every type in `event_types`.
    pub fn register(&mut self, event_types: &[EventType], handler: EventHandler) {
        for event_type in event_types {
            if self
                .handlers
                .insert(event_type.clone(), handler.clone())
                .is_some()
            {
                debug!("replaced handler for {event_type}");
            }
        }
    }

    /// Drop the handlers for `event_types`.
    pub fn remove(&mut self, event_types: &[EventType]) {
        for event_type in event_types {
            self.handlers.remove(event_type);
        }
    }

    /// Handler for an event, if one is registered.
    pub fn get(&self, event_type: &EventType) -> Option<EventHandler> {
        self.handlers.get(event_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A handler paired with the frame it should receive.
pub(crate) type Delivery = (EventHandler, Message);

/// Delivery side of the read loop.
#[derive(Clone)]
pub(crate) enum Dispatcher {
    Inline,
    Queued(mpsc::Sender<Delivery>),
}

impl Dispatcher {
    /// Invoke or enqueue `handler` for `message`.
    pub(crate) async fn deliver(&self, handler: EventHandler, message: Message) {
        match self {
            Self::Inline => handler(&message),
            Self::Queued(tx) => {
                if tx.send((handler, message)).await.is_err() {
                    warn!("dispatch worker is gone, dropping event");
                }
            }
        }
    }
}

/// Run queued handlers until the queue closes.
pub(crate) async fn run_worker(mut rx: mpsc::Receiver<Delivery>) {
    while let Some((handler, message)) = rx.recv().await {
        handler(&message);
    }
    debug!("dispatch worker stopped");
}
