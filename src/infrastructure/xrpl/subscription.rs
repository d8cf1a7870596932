//! Long-lived account subscription with automatic reconnection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, trace, warn};

use super::connection::{RpcTransport, WebSocketConnection};
use super::constants::{
    CONNECTION_TIMEOUT, MAX_RECONNECT_ATTEMPTS, PING_INTERVAL, RECONNECT_DELAY_BASE,
    RECONNECT_DELAY_MAX, RECONNECT_JITTER_MAX, SHUTDOWN_POLL_INTERVAL,
};
use super::error::{XrplError, XrplResult};
use super::payloads::IncomingMessage;
use crate::domain::entities::{AccountAddress, LedgerEvent};
use crate::domain::errors::DispatchError;
use crate::domain::ports::LedgerStreamPort;

pub struct SubscriberConfig {
    pub endpoint: String,
    pub auto_reconnect: bool,
    pub max_reconnect_attempts: u32,
    pub ping_interval: Duration,
}

impl SubscriberConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auto_reconnect: true,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            ping_interval: PING_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}

/// Follows the transactions of one account over a websocket.
pub struct AccountSubscriber {
    config: SubscriberConfig,
    running: Arc<AtomicBool>,
}

impl AccountSubscriber {
    #[must_use]
    pub fn new(config: SubscriberConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl LedgerStreamPort for AccountSubscriber {
    fn subscribe(
        &mut self,
        account: &AccountAddress,
    ) -> Result<mpsc::UnboundedReceiver<LedgerEvent>, DispatchError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(XrplError::AlreadyRunning.into());
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let config = LoopConfig {
            endpoint: self.config.endpoint.clone(),
            account: account.clone(),
            auto_reconnect: self.config.auto_reconnect,
            max_attempts: self.config.max_reconnect_attempts,
            ping_interval: self.config.ping_interval,
        };
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let result = std::panic::AssertUnwindSafe(run_subscription_loop(
                config,
                event_tx.clone(),
                running.clone(),
            ));

            if let Err(panic_info) = result.catch_unwind().await {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                error!(panic = %panic_msg, "Subscription task panicked");
                running.store(false, Ordering::SeqCst);
                let _ = event_tx.send(LedgerEvent::Error {
                    message: format!("Subscription task panicked: {panic_msg}"),
                    recoverable: false,
                });
            }
        });

        Ok(event_rx)
    }

    fn disconnect(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

struct LoopConfig {
    endpoint: String,
    account: AccountAddress,
    auto_reconnect: bool,
    max_attempts: u32,
    ping_interval: Duration,
}

async fn run_subscription_loop(
    config: LoopConfig,
    event_tx: mpsc::UnboundedSender<LedgerEvent>,
    running: Arc<AtomicBool>,
) {
    let mut reconnect_attempts: u32 = 0;

    while running.load(Ordering::SeqCst) {
        match open_subscription(&config).await {
            Ok(mut connection) => {
                info!(endpoint = %config.endpoint, account = %config.account, "Subscribed to account");
                reconnect_attempts = 0;
                let _ = event_tx.send(LedgerEvent::Connected {
                    endpoint: config.endpoint.clone(),
                });

                let result =
                    run_stream(&mut connection, &event_tx, &running, config.ping_interval).await;
                connection.close().await;

                if let Err(e) = result {
                    warn!(error = %e, "Subscription lost");
                    let _ = event_tx.send(LedgerEvent::Disconnected {
                        reason: e.to_string(),
                    });
                    if !e.should_reconnect() {
                        let _ = event_tx.send(LedgerEvent::Error {
                            message: e.to_string(),
                            recoverable: false,
                        });
                        break;
                    }
                    reconnect_attempts += 1;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to subscribe");
                let _ = event_tx.send(LedgerEvent::Error {
                    message: e.to_string(),
                    recoverable: e.should_reconnect(),
                });

                if !e.should_reconnect() || !config.auto_reconnect {
                    break;
                }

                reconnect_attempts += 1;
            }
        }

        if !running.load(Ordering::SeqCst) {
            break;
        }

        if !config.auto_reconnect {
            let _ = event_tx.send(LedgerEvent::Disconnected {
                reason: "Connection closed".to_string(),
            });
            break;
        }

        if reconnect_attempts >= config.max_attempts {
            error!(
                attempts = reconnect_attempts,
                "Max reconnection attempts exceeded"
            );
            let _ = event_tx.send(LedgerEvent::Error {
                message: format!(
                    "Max reconnection attempts ({}) exceeded",
                    config.max_attempts
                ),
                recoverable: false,
            });
            break;
        }

        let delay = calculate_backoff_delay(reconnect_attempts);
        info!(
            attempt = reconnect_attempts,
            delay_ms = delay.as_millis(),
            "Reconnecting to ledger"
        );

        let _ = event_tx.send(LedgerEvent::Reconnecting {
            attempt: reconnect_attempts,
        });

        sleep(delay).await;
    }

    running.store(false, Ordering::SeqCst);
    info!("Subscription loop terminated");
}

async fn open_subscription(config: &LoopConfig) -> XrplResult<WebSocketConnection> {
    let mut connection = WebSocketConnection::connect(&config.endpoint, CONNECTION_TIMEOUT).await?;

    if let Err(e) = connection
        .request("subscribe", json!({ "accounts": [config.account.as_str()] }))
        .await
    {
        connection.close().await;
        return Err(e);
    }

    Ok(connection)
}

/// Forwards stream transactions until the socket fails or `running` clears.
///
/// A keepalive `ping` goes out every `ping_interval`; if the previous one is
/// still unanswered when the next is due, the connection is considered dead.
async fn run_stream(
    connection: &mut WebSocketConnection,
    event_tx: &mpsc::UnboundedSender<LedgerEvent>,
    running: &Arc<AtomicBool>,
    ping_interval: Duration,
) -> XrplResult<()> {
    let mut ping = interval(ping_interval);
    ping.tick().await;
    let mut shutdown_check = interval(SHUTDOWN_POLL_INTERVAL);
    let mut pending_ping: Option<u64> = None;

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            message = connection.receive() => match message? {
                IncomingMessage::Transaction(stream) => {
                    let observed = stream.into_observed();
                    debug!(hash = ?observed.hash, validated = observed.validated, "Account transaction");
                    if event_tx.send(LedgerEvent::Transaction(Box::new(observed))).is_err() {
                        debug!("Event receiver dropped");
                        return Ok(());
                    }
                }
                IncomingMessage::Response(response) if response.id.is_some() && response.id == pending_ping => {
                    trace!("Ping answered");
                    pending_ping = None;
                }
                other => trace!(message = ?other, "Ignoring stream message"),
            },
            _ = ping.tick() => {
                if pending_ping.is_some() {
                    return Err(XrplError::timeout("ping response"));
                }
                pending_ping = Some(connection.send("ping", json!({})).await?);
            }
            _ = shutdown_check.tick() => {}
        }
    }

    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn calculate_backoff_delay(attempt: u32) -> Duration {
    let base_delay = RECONNECT_DELAY_BASE.as_millis() as u64;
    let max_delay = RECONNECT_DELAY_MAX.as_millis() as u64;
    let jitter_max = RECONNECT_JITTER_MAX.as_millis() as u64;

    let exponential_delay = base_delay.saturating_mul(2_u64.saturating_pow(attempt.min(6)));
    let capped_delay = exponential_delay.min(max_delay);

    Duration::from_millis(capped_delay.saturating_add(rand_jitter(jitter_max)))
}

fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);

    nanos % max
}
