//! Delivery channel implementations.

pub mod slack;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::SlackMessage;

/// Trait for delivery channels.
///
/// A channel is handed a fully composed message and reports whether the
/// platform accepted it. Channels do not retry.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver a message.
    async fn send(&self, message: &SlackMessage) -> Result<(), ChannelError>;
}
