//! Ledger submission port definition.

use async_trait::async_trait;

use crate::domain::entities::{Credentials, SubmittedTransaction, TransactionRequest};
use crate::domain::errors::DispatchError;

/// Port for opening ledger sessions.
#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Opens a new session owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `Connection` error if the endpoint cannot be reached.
    async fn open_session(&self) -> Result<Box<dyn LedgerSession>, DispatchError>;

    /// Returns the endpoint sessions connect to.
    fn endpoint(&self) -> &str;
}

/// One open ledger connection.
#[async_trait]
pub trait LedgerSession: Send {
    /// Fills in, signs and submits the transaction, then waits for the
    /// outcome the session is configured to await.
    ///
    /// # Errors
    ///
    /// Returns `Sign` error carrying the ledger's detail when the
    /// transaction is rejected, or `Connection` error if the socket fails.
    async fn sign_and_submit(
        &mut self,
        request: &TransactionRequest,
        credentials: &Credentials,
    ) -> Result<SubmittedTransaction, DispatchError>;

    /// Closes the connection. Safe to call more than once.
    async fn close(&mut self);
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::entities::TxHash;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted ledger behaviour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockBehaviour {
        Succeed,
        FailConnect,
        FailSign,
        HangConnect,
        HangSign,
        HangClose,
    }

    /// Mock ledger port counting opened and closed sessions.
    #[derive(Clone)]
    pub struct MockLedgerPort {
        behaviour: MockBehaviour,
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        submitted: Arc<Mutex<Vec<TransactionRequest>>>,
    }

    impl MockLedgerPort {
        pub fn new(behaviour: MockBehaviour) -> Self {
            Self {
                behaviour,
                opened: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicUsize::new(0)),
                submitted: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }

        pub fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }

        /// Sessions opened and not yet closed.
        pub fn open_sessions(&self) -> usize {
            self.opened() - self.closed()
        }

        pub fn submitted(&self) -> Vec<TransactionRequest> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LedgerPort for MockLedgerPort {
        async fn open_session(&self) -> Result<Box<dyn LedgerSession>, DispatchError> {
            match self.behaviour {
                MockBehaviour::FailConnect => {
                    return Err(DispatchError::connection("connection refused"));
                }
                MockBehaviour::HangConnect => std::future::pending::<()>().await,
                _ => {}
            }

            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockLedgerSession {
                behaviour: self.behaviour,
                closed: Arc::clone(&self.closed),
                submitted: Arc::clone(&self.submitted),
                is_closed: false,
            }))
        }

        fn endpoint(&self) -> &str {
            "wss://mock.invalid"
        }
    }

    struct MockLedgerSession {
        behaviour: MockBehaviour,
        closed: Arc<AtomicUsize>,
        submitted: Arc<Mutex<Vec<TransactionRequest>>>,
        is_closed: bool,
    }

    #[async_trait]
    impl LedgerSession for MockLedgerSession {
        async fn sign_and_submit(
            &mut self,
            request: &TransactionRequest,
            _credentials: &Credentials,
        ) -> Result<SubmittedTransaction, DispatchError> {
            self.submitted.lock().unwrap().push(request.clone());

            match self.behaviour {
                MockBehaviour::FailSign => Err(DispatchError::rejected(
                    "tefBAD_AUTH",
                    "Transaction's public key is not authorized.",
                )),
                MockBehaviour::HangSign => std::future::pending().await,
                _ => Ok(SubmittedTransaction {
                    hash: TxHash::from_bytes(&[0x5A; 32]),
                    engine_result: "tesSUCCESS".to_string(),
                    ledger_index: Some(1234),
                }),
            }
        }

        async fn close(&mut self) {
            if self.behaviour == MockBehaviour::HangClose {
                std::future::pending::<()>().await;
            }
            if !self.is_closed {
                self.is_closed = true;
                self.closed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
