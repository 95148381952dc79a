use async_trait::async_trait;
use log::info;

use crate::error::DeliveryError;
use crate::streamrelay::types::Recipient;

/// Outbound message transport (chat bridge, SMS gateway, ...)
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, text: &str, to: &Recipient) -> Result<(), DeliveryError>;
}

/// Sender that only writes outbound messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, text: &str, to: &Recipient) -> Result<(), DeliveryError> {
        info!("📤 To {}: {}", to, text);
        Ok(())
    }
}
