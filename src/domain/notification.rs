//! User-facing alert model.

use std::time::{Duration, Instant};

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// Neutral information.
    Info,
    /// Completed operation.
    Success,
    /// Failed operation.
    Error,
}

/// Alert shown over the control screen.
///
/// Alerts without a duration stay until dismissed.
#[derive(Debug, Clone)]
pub struct Alert {
    /// Severity.
    pub level: AlertLevel,
    /// Heading line.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Creation time.
    pub created_at: Instant,
    /// First time the alert was drawn.
    pub displayed_at: Option<Instant>,
    /// Auto-dismiss delay, if any.
    pub duration: Option<Duration>,
}

impl Alert {
    /// Creates a modal alert.
    #[must_use]
    pub fn new(level: AlertLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            created_at: Instant::now(),
            displayed_at: None,
            duration: None,
        }
    }

    /// Creates an error alert.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Error, title, message)
    }

    /// Makes the alert dismiss itself after `duration` on screen.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Returns whether a timed alert has been shown long enough.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match (self.duration, self.displayed_at) {
            (Some(duration), Some(start)) => start.elapsed() > duration,
            _ => false,
        }
    }

    /// Records the first draw.
    pub fn mark_displayed(&mut self) {
        if self.displayed_at.is_none() {
            self.displayed_at = Some(Instant::now());
        }
    }
}
