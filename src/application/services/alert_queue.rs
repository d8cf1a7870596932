use std::collections::VecDeque;

use crate::domain::{Alert, AlertLevel};

/// Alerts waiting to be shown, oldest first.
#[derive(Debug, Default)]
pub struct AlertQueue {
    queue: VecDeque<Alert>,
}

impl AlertQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alert: Alert) {
        self.queue.push_back(alert);
    }

    pub fn success(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Alert::new(AlertLevel::Success, title, message));
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Alert::error(title, message));
    }

    /// Closes the alert on screen.
    pub fn dismiss(&mut self) -> Option<Alert> {
        let dismissed = self.queue.pop_front();
        if let Some(next) = self.queue.front_mut() {
            next.mark_displayed();
        }
        dismissed
    }

    /// Drops a timed alert once it has been shown long enough.
    pub fn tick(&mut self) {
        if let Some(front) = self.queue.front_mut() {
            front.mark_displayed();
            if front.is_expired() {
                self.dismiss();
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Alert> {
        self.queue.front()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
