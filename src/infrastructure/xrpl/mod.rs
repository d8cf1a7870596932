//! Ledger access over the rippled websocket API.

pub mod client;
pub mod codec;
pub mod connection;
pub mod constants;
pub mod error;
pub mod payloads;
pub mod subscription;

pub use client::{SessionConfig, XrplConnector, XrplSession};
pub use connection::{RpcTransport, WebSocketConnection};
pub use error::{XrplError, XrplResult};
pub use subscription::{AccountSubscriber, SubscriberConfig};
