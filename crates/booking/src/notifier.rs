//! Best-effort notification dispatch.

use std::sync::Arc;
use std::time::Duration;

use common::UserId;
use tracing::Instrument;

use crate::error::BookingError;
use crate::gateways::{GatewayError, NotificationChannel, NotificationGateway};

/// Fire-and-forget wrapper around a [`NotificationGateway`].
///
/// Each message is delivered on its own task, bounded by a timeout, and
/// carries the caller's span. Failures are logged and counted; they never
/// reach the caller and never roll back what the caller committed.
pub struct Notifier<N> {
    gateway: Arc<N>,
    timeout: Duration,
}

impl<N> Clone for Notifier<N> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            timeout: self.timeout,
        }
    }
}

impl<N> Notifier<N>
where
    N: NotificationGateway + 'static,
{
    /// Creates a notifier bounding each delivery by `timeout`.
    pub fn new(gateway: Arc<N>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Returns the underlying gateway.
    pub fn gateway(&self) -> &Arc<N> {
        &self.gateway
    }

    /// Sends an in-app notification in the background.
    pub fn notify(&self, user_id: UserId, text: impl Into<String>) {
        let gateway = self.gateway.clone();
        let text = text.into();
        self.dispatch(NotificationChannel::InApp, async move {
            gateway.notify(user_id, &text).await
        });
    }

    /// Sends an email in the background.
    pub fn email(&self, email: impl Into<String>, text: impl Into<String>) {
        let gateway = self.gateway.clone();
        let (email, text) = (email.into(), text.into());
        self.dispatch(NotificationChannel::Email, async move {
            gateway.send_email(&email, &text).await
        });
    }

    fn dispatch<F>(&self, channel: NotificationChannel, delivery: F)
    where
        F: Future<Output = Result<(), GatewayError>> + Send + 'static,
    {
        let timeout = self.timeout;
        let task = async move {
            let failure = match tokio::time::timeout(timeout, delivery).await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => BookingError::NotificationFailure(e.to_string()),
                Err(_) => BookingError::NotificationFailure(format!(
                    "{channel} delivery timed out after {timeout:?}"
                )),
            };
            metrics::counter!("notifications_failed_total", "channel" => channel.as_str())
                .increment(1);
            tracing::warn!(%channel, error = %failure, "notification dropped");
        };
        tokio::spawn(task.instrument(tracing::Span::current()));
    }
}
