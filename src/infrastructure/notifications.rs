//! Desktop notifications with conditional compilation.

use crate::domain::ports::NotificationPort;

#[cfg(feature = "notify")]
mod notify_impl {
    use super::NotificationPort;
    use crate::infrastructure::config::app_config::APP_NAME;
    use notify_rust::Notification;

    /// Desktop notification service.
    #[derive(Debug, Clone, Default)]
    pub struct DesktopNotificationService {
        enabled: bool,
    }

    impl DesktopNotificationService {
        #[must_use]
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        #[must_use]
        pub const fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    impl NotificationPort for DesktopNotificationService {
        fn send(&self, title: &str, body: &str) {
            if !self.enabled {
                return;
            }

            let title = title.to_string();
            let body = body.to_string();

            tokio::task::spawn_blocking(move || {
                if let Err(e) = Notification::new()
                    .summary(&title)
                    .body(&body)
                    .appname(APP_NAME)
                    .show()
                {
                    tracing::warn!("Failed to show notification: {}", e);
                }
            });
        }
    }
}

#[cfg(not(feature = "notify"))]
mod stub_impl {
    use super::NotificationPort;

    /// Notification service that drops everything.
    #[derive(Debug, Clone, Default)]
    pub struct DesktopNotificationService;

    impl DesktopNotificationService {
        #[must_use]
        pub fn new(_enabled: bool) -> Self {
            Self
        }

        #[must_use]
        pub const fn is_enabled(&self) -> bool {
            false
        }
    }

    impl NotificationPort for DesktopNotificationService {
        fn send(&self, _title: &str, _body: &str) {}
    }
}

#[cfg(feature = "notify")]
pub use notify_impl::DesktopNotificationService;
#[cfg(not(feature = "notify"))]
pub use stub_impl::DesktopNotificationService;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_service_is_silent() {
        let service = DesktopNotificationService::new(false);
        assert!(!service.is_enabled());
        service.send("Command received", "Executed 'turn_on'");
    }
}
