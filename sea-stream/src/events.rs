//! Stream event types and connection state.
//!
//! Defines the business events pushed for a joined collection, the subset
//! the read loop drops as noise, and the client's connection state.

use serde::{Deserialize, Serialize};

/// Business event types pushed on a collection channel.
///
/// These map 1:1 to the server's event names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Token metadata changed (`item_metadata_updated`).
    ItemMetadataUpdated,
    /// An item was listed for sale (`item_listed`).
    ItemListed,
    /// An item was sold (`item_sold`).
    ItemSold,
    /// An item changed owner outside a sale (`item_transferred`).
    ItemTransferred,
    /// An offer was made on an item (`item_received_offer`).
    ItemReceivedOffer,
    /// An auction bid was made on an item (`item_received_bid`).
    ItemReceivedBid,
    /// A listing or offer was cancelled (`item_cancelled`).
    ItemCancelled,
    /// An offer was made on the whole collection (`collection_offer`).
    CollectionOffer,
    /// An offer was made on items with a given trait (`trait_offer`).
    TraitOffer,
    /// Any other event name, control events included.
    Unknown(String),
}

impl EventType {
    /// Parse an event name from the server.
    pub fn from_str(s: &str) -> Self {
        match s {
            "item_metadata_updated" => Self::ItemMetadataUpdated,
            "item_listed" => Self::ItemListed,
            "item_sold" => Self::ItemSold,
            "item_transferred" => Self::ItemTransferred,
            "item_received_offer" => Self::ItemReceivedOffer,
            "item_received_bid" => Self::ItemReceivedBid,
            "item_cancelled" => Self::ItemCancelled,
            "collection_offer" => Self::CollectionOffer,
            "trait_offer" => Self::TraitOffer,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Convert to the server event name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ItemMetadataUpdated => "item_metadata_updated",
            Self::ItemListed => "item_listed",
            Self::ItemSold => "item_sold",
            Self::ItemTransferred => "item_transferred",
            Self::ItemReceivedOffer => "item_received_offer",
            Self::ItemReceivedBid => "item_received_bid",
            Self::ItemCancelled => "item_cancelled",
            Self::CollectionOffer => "collection_offer",
            Self::TraitOffer => "trait_offer",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Whether the read loop drops this event without dispatching it.
    ///
    /// Bids and offers on traits or whole collections are high-volume noise
    /// for most consumers; handlers registered for them are never called.
    pub fn is_suppressed(&self) -> bool {
        matches!(
            self,
            Self::ItemReceivedBid | Self::TraitOffer | Self::CollectionOffer
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection state of a [`StreamClient`](crate::StreamClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket. Background tasks have stopped or are about to.
    Disconnected,
    /// A connect call is dialing.
    Connecting,
    /// Socket open and background tasks running.
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}
