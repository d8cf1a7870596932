use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use super::error::{XrplError, XrplResult};
use super::payloads::{IncomingMessage, RpcRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// Request/response channel to a ledger server.
#[async_trait]
pub trait RpcTransport: Send {
    /// Sends `command` and waits for the response carrying its id.
    async fn request(&mut self, command: &str, params: Value) -> XrplResult<Value>;
    async fn close(&mut self);
}

pub struct WebSocketConnection {
    writer: Option<WsWriter>,
    reader: Option<WsReader>,
    endpoint: String,
    next_id: u64,
}

impl WebSocketConnection {
    /// Opens a websocket to `endpoint`.
    ///
    /// # Errors
    /// Returns error if the handshake fails or takes longer than `limit`.
    pub async fn connect(endpoint: &str, limit: Duration) -> XrplResult<Self> {
        let (ws_stream, _) = timeout(limit, connect_async(endpoint))
            .await
            .map_err(|_| XrplError::timeout("connection"))?
            .map_err(|e| XrplError::connection_failed(e.to_string()))?;

        let (writer, reader) = ws_stream.split();
        debug!(endpoint = %endpoint, "WebSocket connected");

        Ok(Self {
            writer: Some(writer),
            reader: Some(reader),
            endpoint: endpoint.to_string(),
            next_id: 1,
        })
    }

    /// Writes a request without waiting for its response.
    ///
    /// # Errors
    /// Returns error if the socket is closed or the write fails.
    pub async fn send(&mut self, command: &str, params: Value) -> XrplResult<u64> {
        let id = self.next_id;
        self.next_id += 1;

        let json = serde_json::to_string(&RpcRequest::new(id, command, params)?)
            .map_err(|e| XrplError::serialization(e.to_string()))?;

        let writer = self.writer.as_mut().ok_or(XrplError::NotConnected)?;
        writer
            .send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| XrplError::websocket(e.to_string()))?;

        trace!(id, command, "Request sent");
        Ok(id)
    }

    /// Reads the next ledger message, answering websocket pings on the way.
    ///
    /// # Errors
    /// Returns error when the socket closes or a frame is malformed.
    pub async fn receive(&mut self) -> XrplResult<IncomingMessage> {
        let reader = self.reader.as_mut().ok_or(XrplError::NotConnected)?;

        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => return IncomingMessage::parse(&text),
                Some(Ok(WsMessage::Binary(data))) => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| XrplError::serialization(e.to_string()))?;
                    return IncomingMessage::parse(text);
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Some(writer) = self.writer.as_mut() {
                        let _ = writer.send(WsMessage::Pong(data)).await;
                    }
                }
                Some(Ok(WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(frame))) => {
                    self.writer = None;
                    let (code, reason) = frame.map_or_else(
                        || (1000, "Normal closure".to_string()),
                        |f| (f.code.into(), f.reason.to_string()),
                    );
                    return Err(XrplError::ConnectionClosed { code, reason });
                }
                Some(Err(e)) => {
                    self.writer = None;
                    return Err(XrplError::websocket(e.to_string()));
                }
                None => {
                    self.writer = None;
                    return Err(XrplError::ConnectionClosed {
                        code: 1000,
                        reason: "Stream ended".to_string(),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl RpcTransport for WebSocketConnection {
    async fn request(&mut self, command: &str, params: Value) -> XrplResult<Value> {
        let id = self.send(command, params).await?;

        loop {
            match self.receive().await? {
                IncomingMessage::Response(response) if response.id == Some(id) => {
                    return response.into_result();
                }
                IncomingMessage::Response(response) => {
                    debug!(expected = id, received = ?response.id, "Skipping stale response");
                }
                other => trace!(message = ?other, "Skipping stream message"),
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
        self.reader = None;
        debug!(endpoint = %self.endpoint, "WebSocket connection closed");
    }
}
