//! Notification gateway trait and in-memory implementation.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::UserId;

use super::GatewayError;

/// Delivery channel of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    Email,
    InApp,
}

impl NotificationChannel {
    /// Returns the channel name used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::InApp => "in_app",
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification accepted by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub channel: NotificationChannel,
    /// Email address or user ID, depending on the channel.
    pub recipient: String,
    pub text: String,
}

/// Dispatch of user-facing messages.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Sends an email.
    async fn send_email(&self, email: &str, text: &str) -> Result<(), GatewayError>;

    /// Sends an in-app notification to a user.
    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<SentNotification>,
    attempts: usize,
    fail_on_send: bool,
}

/// In-memory notification gateway for testing and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationGateway {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationGateway {
    /// Creates a gateway with no recorded notifications.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to reject every notification.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the notifications delivered so far.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns how many deliveries were attempted, including rejected ones.
    pub fn attempt_count(&self) -> usize {
        self.state.read().unwrap().attempts
    }

    /// Waits until at least `count` deliveries were attempted.
    ///
    /// Notifications are dispatched in the background, so tests poll for them.
    /// Returns false if the deadline passes first.
    pub async fn wait_for_attempts(&self, count: usize, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            if self.attempt_count() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, channel: NotificationChannel, recipient: String, text: &str) -> Result<(), GatewayError> {
        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        if state.fail_on_send {
            return Err(GatewayError::Unavailable(format!("{channel} channel down")));
        }

        state.sent.push(SentNotification {
            channel,
            recipient,
            text: text.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for InMemoryNotificationGateway {
    async fn send_email(&self, email: &str, text: &str) -> Result<(), GatewayError> {
        self.record(NotificationChannel::Email, email.to_string(), text)
    }

    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), GatewayError> {
        self.record(NotificationChannel::InApp, user_id.to_string(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_both_channels() {
        let gateway = InMemoryNotificationGateway::new();

        gateway.send_email("guest@example.com", "hello").await.unwrap();
        gateway.notify(UserId::new(7), "hi").await.unwrap();

        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].channel, NotificationChannel::Email);
        assert_eq!(sent[0].recipient, "guest@example.com");
        assert_eq!(sent[1].channel, NotificationChannel::InApp);
        assert_eq!(sent[1].recipient, "7");
    }

    #[tokio::test]
    async fn test_fail_on_send_counts_attempt() {
        let gateway = InMemoryNotificationGateway::new();
        gateway.set_fail_on_send(true);

        assert!(gateway.notify(UserId::new(1), "hi").await.is_err());
        assert_eq!(gateway.attempt_count(), 1);
        assert!(gateway.sent().is_empty());
    }
}
