//! Command dispatch use case.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

use crate::application::CancelToken;
use crate::domain::entities::{
    Command, Credentials, DispatchReceipt, DispatchResult, PaymentRoute, SubmittedTransaction,
    TransactionRequest,
};
use crate::domain::errors::DispatchError;
use crate::domain::ports::{LedgerPort, LedgerSession};

/// Upper bound on releasing a ledger session after a dispatch.
const SESSION_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends device commands as memo-carrying payments.
///
/// At most one dispatch runs at a time per instance and its clones; a second
/// call while one is in flight fails with [`DispatchError::Busy`].
#[derive(Clone)]
pub struct DispatchCommandUseCase {
    ledger: Arc<dyn LedgerPort>,
    credentials: Arc<Credentials>,
    route: PaymentRoute,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

/// Releases the in-flight flag when dropped.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DispatchCommandUseCase {
    /// Creates new dispatch use case.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        credentials: Arc<Credentials>,
        route: PaymentRoute,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            credentials,
            route,
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns whether a dispatch is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<InFlightGuard, DispatchError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(Arc::clone(&self.in_flight)))
            .map_err(|_| DispatchError::Busy)
    }

    /// Sends `command` and waits for the ledger's answer.
    ///
    /// The whole call is bounded by the configured timeout and stops early
    /// when `cancel` fires. The session opened for the dispatch is closed on
    /// every path.
    ///
    /// # Errors
    /// Returns `InvalidCommand`, `Busy`, `Connection`, `Sign`, `Timeout` or
    /// `Cancelled`.
    pub async fn execute(&self, command: &str, cancel: &CancelToken) -> DispatchResult {
        let command = Command::new(command)?;
        let _guard = self.acquire().inspect_err(|_| {
            warn!(command = %command, "Dispatch rejected, another command is in flight");
        })?;

        let request = TransactionRequest::command_payment(&self.route, &command);
        let deadline = Instant::now() + self.timeout;

        info!(
            command = %command,
            source = %request.account,
            destination = %request.destination,
            endpoint = self.ledger.endpoint(),
            "Dispatching command"
        );

        let mut session = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(command = %command, "Dispatch cancelled before connecting");
                return Err(DispatchError::Cancelled);
            }
            opened = timeout_at(deadline, self.ledger.open_session()) => match opened {
                Ok(Ok(session)) => session,
                Ok(Err(e)) => {
                    warn!(error = %e, "Failed to open ledger session");
                    return Err(e);
                }
                Err(_) => {
                    warn!(timeout_ms = self.timeout.as_millis(), "Timed out opening ledger session");
                    return Err(DispatchError::timeout(self.timeout));
                }
            },
        };

        let outcome = self
            .submit(session.as_mut(), &request, deadline, cancel)
            .await;
        if timeout(SESSION_CLOSE_TIMEOUT, session.close()).await.is_ok() {
            debug!("Ledger session released");
        } else {
            warn!(
                timeout_ms = SESSION_CLOSE_TIMEOUT.as_millis(),
                "Ledger session did not close in time"
            );
        }

        match outcome {
            Ok(submitted) => {
                info!(
                    command = %command,
                    hash = %submitted.hash,
                    engine_result = %submitted.engine_result,
                    ledger_index = ?submitted.ledger_index,
                    "Command sent"
                );
                Ok(DispatchReceipt::new(command, submitted))
            }
            Err(e) => {
                warn!(command = %command, error = %e, "Command dispatch failed");
                Err(e)
            }
        }
    }

    /// Runs [`execute`](Self::execute) until `interrupt` resolves.
    ///
    /// An interrupt cancels the dispatch and still waits for it to release
    /// its session before returning.
    ///
    /// # Errors
    /// Same as [`execute`](Self::execute); an interrupt yields `Cancelled`.
    pub async fn execute_until(
        &self,
        command: &str,
        interrupt: impl std::future::Future<Output = ()>,
    ) -> DispatchResult {
        let cancel = CancelToken::new();
        let dispatch = self.execute(command, &cancel);
        tokio::pin!(dispatch);

        tokio::select! {
            result = &mut dispatch => result,
            () = interrupt => {
                info!(command, "Dispatch interrupted");
                cancel.cancel();
                dispatch.await
            }
        }
    }

    async fn submit(
        &self,
        session: &mut dyn LedgerSession,
        request: &TransactionRequest,
        deadline: Instant,
        cancel: &CancelToken,
    ) -> Result<SubmittedTransaction, DispatchError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(DispatchError::Cancelled),
            submitted = timeout_at(deadline, session.sign_and_submit(request, &self.credentials)) => {
                submitted.unwrap_or_else(|_| Err(DispatchError::timeout(self.timeout)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AccountSecret, COMMAND_MEMO_TYPE, Drops};
    use crate::domain::errors::DispatchErrorKind;
    use crate::domain::ports::mocks::{MockBehaviour, MockLedgerPort};

    fn credentials() -> Arc<Credentials> {
        let secret = AccountSecret::parse("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
        Arc::new(Credentials::new(secret, None).unwrap())
    }

    fn use_case(ledger: &MockLedgerPort, timeout: Duration) -> DispatchCommandUseCase {
        let credentials = credentials();
        let route = PaymentRoute {
            source: credentials.address().clone(),
            destination: crate::domain::entities::AccountAddress::from_account_id([2u8; 20]),
            amount: Drops(100),
            destination_tag: None,
        };
        DispatchCommandUseCase::new(Arc::new(ledger.clone()), credentials, route, timeout)
    }

    #[tokio::test]
    async fn test_success_returns_hash_and_releases_session() {
        let ledger = MockLedgerPort::new(MockBehaviour::Succeed);
        let dispatcher = use_case(&ledger, Duration::from_secs(5));

        let receipt = dispatcher
            .execute("turn_on", &CancelToken::new())
            .await
            .unwrap();

        assert!(!receipt.hash.as_str().is_empty());
        assert_eq!(receipt.command.as_str(), "turn_on");
        assert_eq!(ledger.opened(), 1);
        assert_eq!(ledger.open_sessions(), 0);
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_request_carries_command_memo() {
        let ledger = MockLedgerPort::new(MockBehaviour::Succeed);
        let dispatcher = use_case(&ledger, Duration::from_secs(5));

        dispatcher
            .execute("turn_off", &CancelToken::new())
            .await
            .unwrap();

        let submitted = ledger.submitted();
        assert_eq!(submitted.len(), 1);
        let memo = &submitted[0].memos[0];
        assert_eq!(memo.memo_type_hex(), Some("494F545F434F4D4D414E44"));
        assert_eq!(memo.decoded_type().as_deref(), Some(COMMAND_MEMO_TYPE));
        assert_eq!(memo.decoded_data().as_deref(), Some("turn_off"));
        assert_eq!(submitted[0].amount, Drops(100));
    }

    #[tokio::test]
    async fn test_connection_failure_leaves_no_open_session() {
        let ledger = MockLedgerPort::new(MockBehaviour::FailConnect);
        let dispatcher = use_case(&ledger, Duration::from_secs(5));

        let err = dispatcher
            .execute("turn_on", &CancelToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::Connection);
        assert_eq!(ledger.open_sessions(), 0);
        assert!(ledger.submitted().is_empty());
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_sign_failure_closes_session() {
        let ledger = MockLedgerPort::new(MockBehaviour::FailSign);
        let dispatcher = use_case(&ledger, Duration::from_secs(5));

        let err = dispatcher
            .execute("turn_on", &CancelToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::Sign);
        assert_eq!(err.engine_result(), Some("tefBAD_AUTH"));
        assert_eq!(ledger.closed(), 1);
        assert_eq!(ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_unresponsive_endpoint_times_out() {
        let ledger = MockLedgerPort::new(MockBehaviour::HangConnect);
        let dispatcher = use_case(&ledger, Duration::from_millis(50));

        let err = tokio::time::timeout(
            Duration::from_secs(2),
            dispatcher.execute("turn_on", &CancelToken::new()),
        )
        .await
        .expect("dispatch must resolve within its own timeout")
        .unwrap_err();

        assert_eq!(err, DispatchError::Timeout { timeout_ms: 50 });
        assert_eq!(ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_hanging_submission_times_out_and_releases_session() {
        let ledger = MockLedgerPort::new(MockBehaviour::HangSign);
        let dispatcher = use_case(&ledger, Duration::from_millis(50));

        let err = dispatcher
            .execute("turn_on", &CancelToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::Timeout);
        assert_eq!(ledger.opened(), 1);
        assert_eq!(ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_stuck_session_close_does_not_block_result() {
        let ledger = MockLedgerPort::new(MockBehaviour::HangClose);
        let dispatcher = use_case(&ledger, Duration::from_secs(30));

        let receipt = tokio::time::timeout(
            SESSION_CLOSE_TIMEOUT + Duration::from_secs(3),
            dispatcher.execute("turn_on", &CancelToken::new()),
        )
        .await
        .expect("dispatch must not wait on a stuck close")
        .unwrap();

        assert_eq!(receipt.command.as_str(), "turn_on");
        assert_eq!(ledger.submitted().len(), 1);
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_second_dispatch_is_busy_and_cancel_releases() {
        let ledger = MockLedgerPort::new(MockBehaviour::HangSign);
        let dispatcher = use_case(&ledger, Duration::from_secs(30));
        let cancel = CancelToken::new();

        let first = {
            let dispatcher = dispatcher.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { dispatcher.execute("turn_on", &cancel).await })
        };

        while ledger.submitted().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(dispatcher.is_busy());

        let second = dispatcher
            .execute("turn_off", &CancelToken::new())
            .await
            .unwrap_err();
        assert_eq!(second, DispatchError::Busy);

        cancel.cancel();
        let first = first.await.unwrap().unwrap_err();

        assert_eq!(first, DispatchError::Cancelled);
        assert_eq!(ledger.opened(), 1);
        assert_eq!(ledger.open_sessions(), 0);
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_interrupt_waits_for_session_release() {
        let ledger = MockLedgerPort::new(MockBehaviour::HangSign);
        let dispatcher = use_case(&ledger, Duration::from_secs(30));
        let (interrupt_tx, interrupt_rx) = tokio::sync::oneshot::channel::<()>();

        let running = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .execute_until("turn_on", async {
                        let _ = interrupt_rx.await;
                    })
                    .await
            })
        };

        while ledger.submitted().is_empty() {
            tokio::task::yield_now().await;
        }
        interrupt_tx.send(()).unwrap();

        let err = running.await.unwrap().unwrap_err();
        assert_eq!(err, DispatchError::Cancelled);
        assert_eq!(ledger.opened(), 1);
        assert_eq!(ledger.open_sessions(), 0);
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_opens_nothing() {
        let ledger = MockLedgerPort::new(MockBehaviour::Succeed);
        let dispatcher = use_case(&ledger, Duration::from_secs(5));
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = dispatcher.execute("turn_on", &cancel).await.unwrap_err();

        assert_eq!(err, DispatchError::Cancelled);
        assert_eq!(ledger.opened(), 0);
    }

    #[tokio::test]
    async fn test_invalid_command_does_no_network_work() {
        let ledger = MockLedgerPort::new(MockBehaviour::Succeed);
        let dispatcher = use_case(&ledger, Duration::from_secs(5));

        let err = dispatcher
            .execute("", &CancelToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::InvalidCommand);
        assert_eq!(ledger.opened(), 0);
    }
}
