//! Account transaction stream port definition.

use tokio::sync::mpsc;

use crate::domain::entities::{AccountAddress, LedgerEvent};
use crate::domain::errors::DispatchError;

/// Port for following an account's transactions.
pub trait LedgerStreamPort: Send + Sync {
    /// Starts streaming transactions that affect `account`.
    ///
    /// # Errors
    ///
    /// Returns error if the stream is already running.
    fn subscribe(
        &mut self,
        account: &AccountAddress,
    ) -> Result<mpsc::UnboundedReceiver<LedgerEvent>, DispatchError>;

    /// Stops the stream.
    fn disconnect(&self);

    /// Returns whether the stream is running.
    fn is_connected(&self) -> bool;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stream that replays scripted events and then closes.
    pub struct MockLedgerStream {
        events: Vec<LedgerEvent>,
        running: Arc<AtomicBool>,
    }

    impl MockLedgerStream {
        pub fn new(events: Vec<LedgerEvent>) -> Self {
            Self {
                events,
                running: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl LedgerStreamPort for MockLedgerStream {
        fn subscribe(
            &mut self,
            _account: &AccountAddress,
        ) -> Result<mpsc::UnboundedReceiver<LedgerEvent>, DispatchError> {
            let (tx, rx) = mpsc::unbounded_channel();
            for event in self.events.drain(..) {
                let _ = tx.send(event);
            }
            self.running.store(true, Ordering::SeqCst);
            Ok(rx)
        }

        fn disconnect(&self) {
            self.running.store(false, Ordering::SeqCst);
        }

        fn is_connected(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }
    }
}
