//! Read loop.
//!
//! Reads one frame at a time until the socket fails, then marks the
//! connection lost and exits. Per frame:
//! 1. decode the envelope; undecodable frames are dropped
//! 2. drop suppressed event types
//! 3. react to control events: a `phx_reply` with a non-ok status rejoins the
//!    collection named by its ref, a `phx_close` is only logged
//! 4. hand the frame to the handler registered for its event type, if any

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::client::Inner;
use crate::events::EventType;
use crate::handlers::Dispatcher;
use crate::protocol::{control, Message};
use crate::transport::FrameSource;

pub(crate) async fn run(
    inner: Arc<Inner>,
    epoch: u64,
    mut source: Box<dyn FrameSource>,
    dispatcher: Dispatcher,
) {
    loop {
        let text = match source.recv().await {
            Ok(text) => text,
            Err(e) => {
                if e.is_unexpected() {
                    warn!("stream connection closed unexpectedly: {e}");
                } else {
                    info!("stream connection closed: {e}");
                }
                inner.mark_lost(epoch).await;
                return;
            }
        };

        let message = match Message::from_json(&text) {
            Ok(message) => message,
            Err(e) => {
                warn!("error decoding frame: {e}");
                continue;
            }
        };

        let event_type = EventType::from_str(&message.event);
        if event_type.is_suppressed() {
            trace!("dropping suppressed {event_type} on {}", message.topic);
            continue;
        }

        match message.event.as_str() {
            control::REPLY => {
                let reply = message.reply();
                if !reply.is_ok() {
                    rejoin(&inner, &message, reply.status.as_deref()).await;
                }
            }
            control::CLOSE => {
                warn!("{} subscription closed", message.topic);
            }
            _ => {}
        }

        let handler = inner.session.lock().await.handlers.get(&event_type);
        match handler {
            Some(handler) => dispatcher.deliver(handler, message).await,
            None => trace!("no handler for {event_type}"),
        }
    }
}

/// Join again after the server refused a control frame.
async fn rejoin(inner: &Inner, reply: &Message, status: Option<&str>) {
    let slug = reply.reference();
    if slug.is_empty() {
        warn!(
            "{} replied with status {status:?} and no ref, not rejoining",
            reply.topic
        );
        return;
    }

    debug!("join for {slug} answered with status {status:?}, rejoining");
    if let Err(e) = inner.join(&[slug]).await {
        error!("rejoin of {slug} failed: {e}");
    }
}
