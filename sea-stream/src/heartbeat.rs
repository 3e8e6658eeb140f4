//! Heartbeat loop.
//!
//! Every heartbeat interval one `heartbeat` frame is sent per tracked
//! collection, in subscription order. The loop ends as soon as the connection
//! it was started for is gone or a send fails; it never reconnects.

use std::sync::Arc;

use tokio::time::{interval_at, Instant};
use tracing::{error, info, trace};

use crate::client::Inner;
use crate::protocol::ControlFrame;

pub(crate) async fn run(inner: Arc<Inner>, epoch: u64) {
    let period = inner.options.heartbeat_interval;
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;

        let topics = {
            let session = inner.session.lock().await;
            if !session.is_live(epoch) {
                info!("connection closed, stopping heartbeat");
                return;
            }
            session.topics.clone()
        };

        for slug in &topics {
            let mut session = inner.session.lock().await;
            if !session.is_live(epoch) {
                info!("connection closed, stopping heartbeat");
                return;
            }
            if let Err(e) = session.send(&ControlFrame::heartbeat(slug)).await {
                error!("error sending heartbeat for {slug}: {e}");
                return;
            }
        }
        trace!("heartbeat sent for {} topic(s)", topics.len());
    }
}
