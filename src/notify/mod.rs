//! Login notifications.
//!
//! After a successful login the application publishes
//! `User {email} logged in successfully.` to a notification topic. Delivery is
//! best effort: failures are logged and never block the login.

use async_trait::async_trait;

pub mod sns;

pub use sns::{create_notifier, SnsNotifier};

use crate::constants::LOGIN_NOTIFICATION_TEMPLATE;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Network(String),

    #[error("Notification rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Notification is not configured: {0}")]
    NotConfigured(String),
}

/// Sink for user-facing notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish `message`; returns the provider's message id when it has one
    async fn publish(&self, message: &str) -> Result<Option<String>, NotifyError>;
}

/// Notifier used when notifications are disabled
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn publish(&self, message: &str) -> Result<Option<String>, NotifyError> {
        log::debug!("Notifications disabled, dropping: {}", message);
        Ok(None)
    }
}

/// The message published after `email` logs in
pub fn login_message(email: &str) -> String {
    LOGIN_NOTIFICATION_TEMPLATE.replace("{}", email)
}
