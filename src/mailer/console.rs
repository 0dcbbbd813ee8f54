use async_trait::async_trait;

use super::{DeliveryError, MailDispatcher, OutboundMessage};

/// Dispatcher for local development: logs the message instead of sending it.
#[derive(Debug, Default)]
pub struct ConsoleDispatcher;

#[async_trait]
impl MailDispatcher for ConsoleDispatcher {
    async fn verify(&self) -> Result<(), DeliveryError> {
        tracing::info!("Console mail adapter active, messages will not leave this process");
        Ok(())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            body = %message.body,
            "Email sent (console)"
        );
        Ok(())
    }
}
