//! Typed payloads for the main business events.
//!
//! The client never decodes payloads itself; these records are for handlers
//! that want typed access instead of the raw JSON.
//!
//! ```no_run
//! # use sea_stream::{StreamClient, ClientOptions};
//! # async fn demo(client: StreamClient) {
//! client
//!     .on_item_sold(|message| {
//!         if let Some(event) = message.as_item_sold() {
//!             println!("sold for {}", event.payload.sale_price);
//!         }
//!     })
//!     .await;
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::EventType;
use crate::protocol::Message;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    pub slug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub animation_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub metadata_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub chain: Chain,
    #[serde(default)]
    pub metadata: Metadata,
    /// `<chain>/<contract>/<token id>`.
    pub nft_id: String,
    #[serde(default)]
    pub permalink: String,
}

/// Any account reference (maker, taker, sender, receiver).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentToken {
    pub address: String,
    pub decimals: u32,
    #[serde(default)]
    pub eth_price: String,
    #[serde(default)]
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub usd_price: String,
}

/// One entry of a Seaport order's offer or consideration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_type: i32,
    pub token: String,
    pub identifier_or_criteria: String,
    pub start_amount: String,
    pub end_amount: String,
    /// Only set on consideration items.
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Seaport order parameters.
///
/// `counter` is left out: the feed sends it as either a number or a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParameters {
    pub offerer: String,
    #[serde(default)]
    pub offer: Vec<OrderItem>,
    #[serde(default)]
    pub consideration: Vec<OrderItem>,
    pub start_time: String,
    pub end_time: String,
    pub order_type: i32,
    pub zone: String,
    pub zone_hash: String,
    pub salt: String,
    pub conduit_key: String,
    pub total_original_consideration_items: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolData {
    pub parameters: OrderParameters,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListedPayload {
    pub base_price: String,
    pub collection: Collection,
    pub event_timestamp: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_private: bool,
    pub item: Item,
    pub listing_date: Option<DateTime<Utc>>,
    pub listing_type: Option<String>,
    pub maker: Account,
    pub order_hash: String,
    pub payment_token: PaymentToken,
    #[serde(default)]
    pub protocol_address: Option<String>,
    #[serde(default)]
    pub protocol_data: Option<ProtocolData>,
    pub quantity: u64,
    pub taker: Option<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSoldPayload {
    pub closing_date: DateTime<Utc>,
    pub collection: Collection,
    pub event_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_private: bool,
    pub item: Item,
    pub listing_type: Option<String>,
    pub maker: Account,
    pub order_hash: String,
    pub payment_token: PaymentToken,
    #[serde(default)]
    pub protocol_address: Option<String>,
    #[serde(default)]
    pub protocol_data: Option<ProtocolData>,
    pub quantity: u64,
    pub sale_price: String,
    pub taker: Account,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCancelledPayload {
    pub base_price: Option<String>,
    pub collection: Collection,
    pub event_timestamp: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_private: bool,
    pub item: Item,
    pub listing_date: Option<DateTime<Utc>>,
    /// Shape varies by listing kind; kept undecoded.
    #[serde(default)]
    pub listing_type: serde_json::Value,
    pub maker: Option<Account>,
    pub order_hash: String,
    pub payment_token: PaymentToken,
    #[serde(default)]
    pub protocol_address: Option<String>,
    #[serde(default)]
    pub protocol_data: Option<ProtocolData>,
    pub quantity: u64,
    pub taker: Option<Account>,
    pub transaction: Option<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTransferredPayload {
    pub collection: Collection,
    pub event_timestamp: DateTime<Utc>,
    pub from_account: Account,
    pub item: Item,
    pub quantity: u64,
    pub to_account: Account,
    pub transaction: Transaction,
}

/// Envelope payload of every business event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent<T> {
    pub event_type: String,
    pub sent_at: String,
    pub payload: T,
}

pub type ItemListedEvent = StreamEvent<ItemListedPayload>;
pub type ItemSoldEvent = StreamEvent<ItemSoldPayload>;
pub type ItemCancelledEvent = StreamEvent<ItemCancelledPayload>;
pub type ItemTransferredEvent = StreamEvent<ItemTransferredPayload>;

impl Message {
    fn decode_if<T: serde::de::DeserializeOwned>(&self, expected: EventType) -> Option<T> {
        if EventType::from_str(&self.event) == expected {
            self.decode().ok()
        } else {
            None
        }
    }

    /// Try to parse the payload as an item-listed event.
    pub fn as_item_listed(&self) -> Option<ItemListedEvent> {
        self.decode_if(EventType::ItemListed)
    }

    /// Try to parse the payload as an item-sold event.
    pub fn as_item_sold(&self) -> Option<ItemSoldEvent> {
        self.decode_if(EventType::ItemSold)
    }

    /// Try to parse the payload as an item-cancelled event.
    pub fn as_item_cancelled(&self) -> Option<ItemCancelledEvent> {
        self.decode_if(EventType::ItemCancelled)
    }

    /// Try to parse the payload as an item-transferred event.
    pub fn as_item_transferred(&self) -> Option<ItemTransferredEvent> {
        self.decode_if(EventType::ItemTransferred)
    }
}
