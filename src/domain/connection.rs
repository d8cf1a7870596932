//! Ledger connection state.

/// Connection state shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No session open.
    #[default]
    Disconnected,
    /// Opening a session.
    Connecting,
    /// Session open.
    Connected,
    /// Stream lost, retrying.
    Reconnecting,
    /// Last attempt failed.
    Error,
}

impl ConnectionStatus {
    /// Returns short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Idle",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Reconnecting => "Reconnecting",
            Self::Error => "Error",
        }
    }
}
