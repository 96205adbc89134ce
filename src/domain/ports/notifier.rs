//! Notifier port trait.

use async_trait::async_trait;

use crate::domain::models::ChangeEvent;

/// Channel that change notifications are delivered to.
///
/// Delivery is fire-and-forget: implementations log their own failures
/// and never report them to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an already-serialized payload.
    async fn publish(&self, payload: Vec<u8>);

    /// Deliver a change event.
    ///
    /// The default serializes the event as JSON and hands it to
    /// [`publish`](Notifier::publish).
    async fn notify(&self, event: &ChangeEvent) {
        match serde_json::to_vec(event) {
            Ok(payload) => self.publish(payload).await,
            Err(e) => tracing::warn!(
                source = %event.source_name,
                error = %e,
                "Failed to serialize change event"
            ),
        }
    }

    /// Human-readable name for this channel (e.g., "teams").
    fn channel_name(&self) -> &str;
}
