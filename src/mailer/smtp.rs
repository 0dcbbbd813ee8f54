use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

use super::{DeliveryError, MailDispatcher, OutboundMessage};

/// SMTP dispatcher relaying through an authenticated STARTTLS submission server.
#[derive(Debug)]
pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    has_credentials: bool,
}

impl SmtpDispatcher {
    /// Create a new SMTP dispatcher.
    ///
    /// Missing credentials are accepted here so the service can start; `verify`
    /// reports them and the server rejects the eventual send.
    pub fn new(
        host: &str,
        port: u16,
        user: Option<String>,
        pass: Option<String>,
    ) -> Result<Self, DeliveryError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DeliveryError::Config(format!("Invalid SMTP relay '{}': {}", host, e)))?
            .port(port);

        let has_credentials = match (user, pass) {
            (Some(user), Some(pass)) => {
                builder = builder.credentials(Credentials::new(user, pass));
                true
            }
            _ => false,
        };

        Ok(Self {
            transport: builder.build(),
            host: host.to_string(),
            has_credentials,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| DeliveryError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl MailDispatcher for SmtpDispatcher {
    async fn verify(&self) -> Result<(), DeliveryError> {
        if !self.has_credentials {
            return Err(DeliveryError::Config(
                "Email credentials are not configured (CONTACT_RELAY_EMAIL_USER / CONTACT_RELAY_EMAIL_PASS)"
                    .to_string(),
            ));
        }

        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DeliveryError::Transport(format!(
                "SMTP server {} did not accept the connection test",
                self.host
            ))),
            Err(e) => Err(DeliveryError::Transport(e.to_string())),
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let from = parse_mailbox(&message.from)?;
        let to = parse_mailbox(&message.to)?;

        let email = Message::builder()
            .from(from.clone())
            .reply_to(from)
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}
