//! Frame transports — the connection-holding seam
//!
//! `FrameTransport` abstracts the open socket so routing can be driven
//! by anything that yields text frames: the production `WsTransport`
//! over tokio-tungstenite, or the in-memory `MemoryTransport` for tests
//! and single-process use.

use crate::error::{PusherError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Owns an open connection delivering text frames
///
/// `recv` blocks until a frame arrives or the connection closes
/// (`Ok(None)`); `send` and `close` release the socket on every exit
/// path by marking the transport closed. No retries live here — a
/// failed receive propagates to the caller.
#[async_trait]
pub trait FrameTransport: Send {
    /// Receive the next text frame, or `None` once the connection closes
    async fn recv(&mut self) -> Result<Option<String>>;

    /// Send a text frame
    async fn send(&mut self, frame: String) -> Result<()>;

    /// Close the connection
    async fn close(&mut self) -> Result<()>;

    /// Non-blocking closed-state predicate
    fn is_closed(&self) -> bool;
}

/// Connection parameters for the Pusher endpoint
///
/// Defaults carry the production endpoint observed on the live service.
#[derive(Debug, Clone)]
pub struct PusherConfig {
    /// Websocket host, e.g. `ws-us2.pusher.com`
    pub host: String,
    /// Application key segment of the connection URL
    pub app_key: String,
    /// Pusher protocol version
    pub protocol: u32,
    /// Client version advertised in the query string
    pub client_version: String,
}

impl Default for PusherConfig {
    fn default() -> Self {
        Self {
            host: "ws-us2.pusher.com".to_string(),
            app_key: "eb1d5f283081a78b932c".to_string(),
            protocol: 7,
            client_version: "7.6.0".to_string(),
        }
    }
}

impl PusherConfig {
    /// Full connection URL
    pub fn endpoint(&self) -> String {
        format!(
            "wss://{}/app/{}?protocol={}&client=js&version={}&flash=false",
            self.host, self.app_key, self.protocol, self.client_version
        )
    }
}

/// Production transport over a tokio-tungstenite websocket
pub struct WsTransport {
    ws: Ws,
    closed: bool,
}

impl WsTransport {
    /// Connect to the configured Pusher endpoint
    pub async fn connect(config: &PusherConfig) -> Result<Self> {
        let url = config.endpoint();
        let (ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| PusherError::Connection(format!("{}: {}", url, e)))?;

        tracing::info!(host = %config.host, "Connected to Pusher endpoint");

        Ok(Self { ws, closed: false })
    }
}

#[async_trait]
impl FrameTransport for WsTransport {
    async fn recv(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }

        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                // Binary and control frames are connection-scoped;
                // tungstenite answers pings itself on the next flush.
                Some(Ok(Message::Binary(_)))
                | Some(Ok(Message::Ping(_)))
                | Some(Ok(Message::Pong(_)))
                | Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) | None => {
                    self.closed = true;
                    return Ok(None);
                }
                Some(Err(e)) => {
                    self.closed = true;
                    return Err(e.into());
                }
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<()> {
        if self.closed {
            return Err(PusherError::Closed);
        }

        match self.ws.send(Message::Text(frame.into())).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.closed = true;
                Err(e.into())
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        // Closed-state flips first so the socket is considered released
        // even when the close handshake itself fails.
        self.closed = true;
        self.ws.close(None).await?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// In-memory transport for testing and single-process use
///
/// Serves queued frames in order, records everything sent, and reports
/// closed once the queue drains (or `close` is called).
#[derive(Debug, Default)]
pub struct MemoryTransport {
    incoming: VecDeque<String>,
    sent: Vec<String>,
    closed: bool,
}

impl MemoryTransport {
    pub fn new(frames: impl IntoIterator<Item = String>) -> Self {
        Self {
            incoming: frames.into_iter().collect(),
            sent: Vec::new(),
            closed: false,
        }
    }

    /// Queue another frame for delivery
    pub fn push_frame(&mut self, frame: impl Into<String>) {
        self.incoming.push_back(frame.into());
    }

    /// Frames sent through this transport, in order
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

#[async_trait]
impl FrameTransport for MemoryTransport {
    async fn recv(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }
        match self.incoming.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => {
                self.closed = true;
                Ok(None)
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<()> {
        if self.closed {
            return Err(PusherError::Closed);
        }
        self.sent.push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_matches_live_service() {
        let url = PusherConfig::default().endpoint();
        assert_eq!(
            url,
            "wss://ws-us2.pusher.com/app/eb1d5f283081a78b932c?protocol=7&client=js&version=7.6.0&flash=false"
        );
    }

    #[test]
    fn test_endpoint_honors_overrides() {
        let config = PusherConfig {
            host: "ws-eu.pusher.com".to_string(),
            app_key: "abc".to_string(),
            protocol: 8,
            client_version: "9.0.0".to_string(),
        };
        assert_eq!(
            config.endpoint(),
            "wss://ws-eu.pusher.com/app/abc?protocol=8&client=js&version=9.0.0&flash=false"
        );
    }

    #[tokio::test]
    async fn test_memory_transport_serves_frames_in_order() {
        let mut transport = MemoryTransport::new(["one".to_string(), "two".to_string()]);

        assert_eq!(transport.recv().await.unwrap().as_deref(), Some("one"));
        assert_eq!(transport.recv().await.unwrap().as_deref(), Some("two"));
        assert!(!transport.is_closed());

        // Drained queue reads as a clean close
        assert!(transport.recv().await.unwrap().is_none());
        assert!(transport.is_closed());
    }

    #[tokio::test]
    async fn test_memory_transport_records_sends() {
        let mut transport = MemoryTransport::default();
        transport.send("a".to_string()).await.unwrap();
        transport.send("b".to_string()).await.unwrap();
        assert_eq!(transport.sent(), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let mut transport = MemoryTransport::default();
        transport.close().await.unwrap();

        let err = transport.send("x".to_string()).await.unwrap_err();
        assert!(matches!(err, PusherError::Closed));
        assert!(transport.recv().await.unwrap().is_none());
    }
}
