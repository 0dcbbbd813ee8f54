use crate::audit::AuditLog;
use crate::config::{Config, MailAdapter};
use std::sync::Arc;

/// A fully addressed message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Abstract interface over the mail transport. Swappable per environment and in tests.
///
/// Implementations make exactly one delivery attempt per `send` call.
#[async_trait::async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Checks that the transport is usable. Called once at startup; the
    /// outcome is reported, never enforced.
    async fn verify(&self) -> Result<(), DeliveryError>;

    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// Errors reported by a mail transport.
///
/// `Display` carries only the description, so callers can surface it to clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("{0}")]
    Config(String),
    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("Failed to build email message: {0}")]
    Build(String),
    #[error("{0}")]
    Transport(String),
}

pub use console::ConsoleDispatcher;
pub use smtp::SmtpDispatcher;

mod console;
mod smtp;

/// Runs the startup check and records the outcome in the audit log.
/// A failed check does not stop the service.
///
/// A missing recipient and a failing transport are both reported; the
/// ready line is only written when neither applies.
pub async fn verify_and_report(
    dispatcher: &dyn MailDispatcher,
    recipient: Option<&str>,
    audit: &AuditLog,
) -> bool {
    let mut ready = true;

    if recipient.is_none() {
        audit.error("Email configuration error: Recipient address is not configured");
        ready = false;
    }

    if let Err(e) = dispatcher.verify().await {
        audit.error(format!("Email configuration error: {}", e));
        ready = false;
    }

    if ready {
        audit.info("Server is ready to send emails");
    }
    ready
}

/// Build the dispatcher selected by the configuration.
pub fn from_config(config: &Config) -> Result<Arc<dyn MailDispatcher>, DeliveryError> {
    match config.mail_adapter {
        MailAdapter::Console => Ok(Arc::new(ConsoleDispatcher)),
        MailAdapter::Smtp => Ok(Arc::new(SmtpDispatcher::new(
            &config.smtp_host,
            config.smtp_port,
            config.email_user.clone(),
            config.email_pass.clone(),
        )?)),
    }
}
