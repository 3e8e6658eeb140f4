//! seastream stream - Phoenix channel client for collection events.
//!
//! This crate provides the connection manager for the marketplace event
//! stream:
//! - A single WebSocket connection dialed with bounded retry
//! - Per-collection channel joins and leaves
//! - A heartbeat per tracked collection on every tick
//! - Event dispatch to one registered handler per event type
//! - Automatic rejoin when the server refuses a join
//!
//! ```no_run
//! use sea_stream::{ClientOptions, Network, StreamClient};
//!
//! # async fn run() -> sea_stream::SeaResult<()> {
//! let client = StreamClient::new(ClientOptions::new("my-token").with_network(Network::Mainnet));
//! client
//!     .on_item_listed(|message| println!("{}", message.payload_str()))
//!     .await;
//! client.connect().await?;
//! client.subscribe(&["azuki"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod events;
pub mod handlers;
mod heartbeat;
pub mod options;
pub mod payloads;
pub mod protocol;
mod reader;
pub mod slot;
pub mod subscription;
pub mod transport;

// Re-export key types
pub use client::StreamClient;
pub use events::{ConnectionState, EventType};
pub use handlers::{DispatchMode, EventHandler, HandlerTable};
pub use options::ClientOptions;
pub use payloads::{
    ItemCancelledEvent, ItemCancelledPayload, ItemListedEvent, ItemListedPayload, ItemSoldEvent,
    ItemSoldPayload, ItemTransferredEvent, ItemTransferredPayload, StreamEvent,
};
pub use protocol::{ControlFrame, Message, PhxReply};
pub use slot::ClientSlot;
pub use transport::{Dialer, FrameSink, FrameSource, ReadError, Transport, WsDialer};

pub use sea_core::{Network, SeaError, SeaResult};
