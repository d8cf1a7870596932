use std::time::Duration;

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

pub const RECONNECT_DELAY_BASE: Duration = Duration::from_secs(1);
pub const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(60);
pub const RECONNECT_JITTER_MAX: Duration = Duration::from_millis(500);
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

pub const PING_INTERVAL: Duration = Duration::from_secs(120);
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Prefix of the payload a single signer signs (`STX\0`).
pub const HASH_PREFIX_TX_SIGN: [u8; 4] = [0x53, 0x54, 0x58, 0x00];
/// Prefix hashed with a signed blob to form its identifier (`TXN\0`).
pub const HASH_PREFIX_TX_ID: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// Requires canonical signatures.
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

pub const RESULT_SUCCESS: &str = "tesSUCCESS";
pub const RESULT_QUEUED: &str = "terQUEUED";
pub const ERROR_TXN_NOT_FOUND: &str = "txnNotFound";

/// Outcome class of a provisional engine result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineResultClass {
    /// Applied or queued; may still fail before validation.
    Provisional,
    /// May succeed once the ledger catches up (`ter`).
    Retry,
    /// Included with a fee charged but not applied (`tec`).
    Claimed,
    /// Never included (`tem`, `tef`, `tel`).
    Rejected,
}

impl EngineResultClass {
    #[must_use]
    pub fn of(engine_result: &str) -> Self {
        if engine_result.starts_with("tes") || engine_result == RESULT_QUEUED {
            Self::Provisional
        } else if engine_result.starts_with("ter") {
            Self::Retry
        } else if engine_result.starts_with("tec") {
            Self::Claimed
        } else {
            Self::Rejected
        }
    }
}
