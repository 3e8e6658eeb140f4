//! Socket transport.
//!
//! The client talks to the socket through three small traits so the
//! connection manager does not care what carries the frames: a [`Dialer`]
//! opens a connection and returns its two halves, a [`FrameSink`] for writes
//! (shared behind the client's mutex) and a [`FrameSource`] for reads (owned
//! by the read loop). [`WsDialer`] is the production implementation over
//! `tokio-tungstenite`.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage, Utf8Bytes};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use sea_core::error::{SeaError, SeaResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a frame read ended the connection.
#[derive(Debug, Clone, Error)]
pub enum ReadError {
    /// The peer sent a close frame.
    #[error("closed by peer (code {code:?}): {reason}")]
    Closed {
        /// Close code, when the frame carried one.
        code: Option<u16>,
        /// Close reason text.
        reason: String,
    },
    /// The stream ended without a close handshake.
    #[error("stream ended")]
    Eof,
    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ReadError {
    /// Whether this is an unexpected closure rather than a clean shutdown.
    ///
    /// Normal (1000) and going-away (1001) closes and a plain end of stream
    /// count as clean.
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Closed { code, .. } => !matches!(code, None | Some(1000) | Some(1001)),
            Self::Eof => false,
            Self::Transport(_) => true,
        }
    }
}

/// Write half of a connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> SeaResult<()>;

    /// Send a protocol-level close frame (normal closure).
    async fn send_close(&mut self) -> SeaResult<()>;

    /// Close the underlying socket.
    async fn shutdown(&mut self) -> SeaResult<()>;
}

/// Read half of a connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next text frame.
    async fn recv(&mut self) -> Result<String, ReadError>;
}

/// Both halves of a freshly dialed connection.
pub struct Transport {
    pub sink: Box<dyn FrameSink>,
    pub source: Box<dyn FrameSource>,
}

/// Opens connections.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, url: &str) -> SeaResult<Transport>;
}

/// Dials real WebSocket connections (TLS via rustls).
#[derive(Debug, Clone, Copy, Default)]
pub struct WsDialer;

#[async_trait]
impl Dialer for WsDialer {
    async fn dial(&self, url: &str) -> SeaResult<Transport> {
        let (ws, response) = connect_async(url)
            .await
            .map_err(|e| SeaError::Socket(e.to_string()))?;
        debug!("websocket handshake completed with status {}", response.status());

        let (sink, stream) = ws.split();
        Ok(Transport {
            sink: Box::new(WsSink { sink }),
            source: Box::new(WsSource { stream }),
        })
    }
}

struct WsSink {
    sink: SplitSink<WsStream, WsMessage>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> SeaResult<()> {
        self.sink
            .send(WsMessage::text(text))
            .await
            .map_err(|e| SeaError::Socket(e.to_string()))
    }

    async fn send_close(&mut self) -> SeaResult<()> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Utf8Bytes::from_static(""),
        };
        self.sink
            .send(WsMessage::Close(Some(frame)))
            .await
            .map_err(|e| SeaError::Socket(e.to_string()))
    }

    async fn shutdown(&mut self) -> SeaResult<()> {
        self.sink
            .close()
            .await
            .map_err(|e| SeaError::Socket(e.to_string()))
    }
}

struct WsSource {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn recv(&mut self) -> Result<String, ReadError> {
        loop {
            match self.stream.next().await {
                None | Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    return Err(ReadError::Eof)
                }
                Some(Err(e)) => return Err(ReadError::Transport(e.to_string())),
                Some(Ok(WsMessage::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Ok(text),
                    Err(_) => warn!("dropping non-utf8 binary frame ({} bytes)", bytes.len()),
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    return Err(match frame {
                        Some(frame) => ReadError::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.as_str().to_owned(),
                        },
                        None => ReadError::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    })
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => continue,
            }
        }
    }
}
