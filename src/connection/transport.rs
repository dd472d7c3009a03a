//! Transport seam: the connection loop re-dials through [`Connector`] on
//! every (re)connect attempt and talks frames through [`Transport`].

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::WsConfig;
use crate::error::SyncError;

/// One established duplex message channel carrying JSON-shaped text frames.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: String) -> Result<(), SyncError>;

    /// Next text frame; `None` once the peer closed the channel.
    async fn recv(&mut self) -> Option<Result<String, SyncError>>;

    async fn close(&mut self);
}

#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn Transport>, SyncError>;
}

/// Production connector: dials the backend WebSocket endpoint keyed by
/// session id and local user identity.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(config: &WsConfig, session_id: &str, user_id: &str) -> Self {
        Self {
            url: format!(
                "{}?sessionId={}&userId={}",
                config.url, session_id, user_id
            ),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, SyncError> {
        let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        Ok(Box::new(WsTransport { stream }))
    }
}

struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), SyncError> {
        self.stream.send(WsMessage::Text(frame.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, SyncError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Text(text)) => return Some(Ok(text.to_string())),
                Ok(WsMessage::Close(_)) => return None,
                // Protocol-level ping/pong and binary frames are not part
                // of the message catalog.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
