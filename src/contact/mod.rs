//! Contact-form submissions: parse the untyped payload, validate it, relay it
//! as an email and leave an audit trail of every step.
//!
//! One request moves through `Received -> Validating -> Rejected` or
//! `Received -> Validating -> Sending -> Sent | Failed`. Whatever the outcome,
//! at least one audit record is written before the caller gets a result.

use crate::audit::AuditLog;
use crate::mailer::{DeliveryError, MailDispatcher, OutboundMessage};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Field names as they arrive from the form, case-sensitive.
pub const NAME_FIELD: &str = "Name";
pub const EMAIL_FIELD: &str = "Email";
pub const PHONE_FIELD: &str = "Phone";
pub const MESSAGE_FIELD: &str = "Message";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Required fields are missing")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
}

/// Everything that can end a submission unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// A validated contact request. Only exists for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Text of a submitted field, or `None` when it counts as missing.
///
/// Empty strings, `null`, `false`, zero and compound values are all missing.
/// Other scalars are taken as their textual form.
fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Loose syntactic check: `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot in the domain must have at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

impl FormSubmission {
    /// Turns an untyped payload into a submission, or says why it cannot be one.
    ///
    /// Presence of all four fields is checked before the email format.
    /// The phone number is opaque text.
    pub fn parse(fields: &Map<String, Value>) -> Result<Self, ValidationError> {
        let (Some(name), Some(email), Some(phone), Some(message)) = (
            field_text(fields, NAME_FIELD),
            field_text(fields, EMAIL_FIELD),
            field_text(fields, PHONE_FIELD),
            field_text(fields, MESSAGE_FIELD),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(Self {
            name,
            email,
            phone,
            message,
        })
    }

    pub fn subject(&self) -> String {
        format!("New Contact Form Submission from {}", self.name)
    }

    pub fn body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nPhone: {}\n\nMessage:\n{}\n",
            self.name, self.email, self.phone, self.message
        )
    }

    /// Addresses the submission to the configured recipient. The submitter
    /// only ever chooses the `from` side.
    pub fn to_message(&self, recipient: &str) -> OutboundMessage {
        OutboundMessage {
            from: self.email.clone(),
            to: recipient.to_string(),
            subject: self.subject(),
            body: self.body(),
        }
    }
}

/// The submission pipeline with its collaborators injected.
#[derive(Clone)]
pub struct ContactService {
    audit: Arc<AuditLog>,
    mailer: Arc<dyn MailDispatcher>,
    recipient: Option<String>,
}

impl ContactService {
    pub fn new(
        audit: Arc<AuditLog>,
        mailer: Arc<dyn MailDispatcher>,
        recipient: Option<String>,
    ) -> Self {
        Self {
            audit,
            mailer,
            recipient,
        }
    }

    /// Handles one submission end to end: a single delivery attempt, no retry.
    pub async fn submit(&self, fields: &Map<String, Value>) -> Result<(), ContactError> {
        self.audit.info("New form submission received");

        let result = self.validate_and_send(fields).await;
        match &result {
            Ok(()) => self.audit.info("Email sent successfully"),
            Err(e) => self.audit.error(format!("Error in form submission: {}", e)),
        }
        result
    }

    async fn validate_and_send(&self, fields: &Map<String, Value>) -> Result<(), ContactError> {
        let submission = FormSubmission::parse(fields)?;
        self.audit.info(format!(
            "Form data received - Name: {}, Email: {}, Phone: {}",
            submission.name, submission.email, submission.phone
        ));

        let recipient = self.recipient.as_deref().ok_or_else(|| {
            DeliveryError::Config("Recipient address is not configured".to_string())
        })?;
        let message = submission.to_message(recipient);

        self.audit
            .info(format!("Attempting to send email to: {}", message.to));
        self.mailer.send(&message).await?;
        Ok(())
    }
}
