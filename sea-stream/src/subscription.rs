//! Collection subscriptions.
//!
//! Joins and leaves are sent one frame per collection, each under the client
//! mutex. Nothing waits for the server's acknowledgement: a refused join
//! comes back later as a `phx_reply` and is retried by the read loop.

use tracing::{error, info};

use sea_core::error::{SeaError, SeaResult};

use crate::client::{Inner, StreamClient};
use crate::protocol::ControlFrame;

/// Reject the whole batch before anything is sent.
fn validate_slugs<S: AsRef<str>>(slugs: &[S]) -> SeaResult<()> {
    if let Some(position) = slugs.iter().position(|s| s.as_ref().trim().is_empty()) {
        return Err(SeaError::InvalidTopic(format!(
            "collection slug at position {position} is blank"
        )));
    }
    Ok(())
}

impl Inner {
    /// Send a join for every slug and start tracking it.
    pub(crate) async fn join<S: AsRef<str> + Sync>(&self, slugs: &[S]) -> SeaResult<()> {
        validate_slugs(slugs)?;
        for slug in slugs {
            let slug = slug.as_ref();
            let frame = ControlFrame::join(slug);
            {
                let mut session = self.session.lock().await;
                if let Err(e) = session.send(&frame).await {
                    error!("error sending subscription message for {}: {e}", frame.topic);
                    return Err(e);
                }
                if !session.topics.iter().any(|t| t == slug) {
                    session.topics.push(slug.to_string());
                }
            }
            info!("joined channel {}", frame.topic);
        }
        Ok(())
    }

    /// Send a leave for every slug and stop tracking it.
    pub(crate) async fn leave<S: AsRef<str> + Sync>(&self, slugs: &[S]) -> SeaResult<()> {
        validate_slugs(slugs)?;
        for slug in slugs {
            let slug = slug.as_ref();
            let frame = ControlFrame::leave(slug);
            {
                let mut session = self.session.lock().await;
                if let Err(e) = session.send(&frame).await {
                    error!("error sending unsubscription message for {}: {e}", frame.topic);
                    return Err(e);
                }
                session.topics.retain(|t| t != slug);
            }
            info!("left channel {}", frame.topic);
        }
        Ok(())
    }
}

impl StreamClient {
    /// Join the channel of each collection, in order.
    ///
    /// Blank slugs fail the whole call before any frame is sent. A send
    /// failure stops the batch; collections joined before it stay joined.
    pub async fn subscribe<S: AsRef<str> + Sync>(&self, collections: &[S]) -> SeaResult<()> {
        self.inner.join(collections).await
    }

    /// Leave the channel of each collection, in order.
    pub async fn unsubscribe<S: AsRef<str> + Sync>(&self, collections: &[S]) -> SeaResult<()> {
        self.inner.leave(collections).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slugs() {
        assert!(validate_slugs::<&str>(&[]).is_ok());
        assert!(validate_slugs(&["azuki", "doodles-official"]).is_ok());

        let err = validate_slugs(&["azuki", "  "]).unwrap_err();
        assert!(matches!(err, SeaError::InvalidTopic(msg) if msg.contains("position 1")));
    }
}
