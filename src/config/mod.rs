use std::env;
use std::fmt;
use std::str::FromStr;
use anyhow::{Result, anyhow};

/// Which mail transport the dispatcher should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailAdapter {
    /// Relay through an SMTP server with STARTTLS.
    Smtp,
    /// Print messages to the diagnostic log instead of sending them.
    Console,
}

impl FromStr for MailAdapter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(MailAdapter::Smtp),
            "console" => Ok(MailAdapter::Console),
            other => Err(anyhow!("unknown mail adapter '{}'", other)),
        }
    }
}

impl fmt::Display for MailAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailAdapter::Smtp => f.write_str("smtp"),
            MailAdapter::Console => f.write_str("console"),
        }
    }
}

/// Holds the mail credential, so it is neither serializable nor printed in clear.
#[derive(Clone)]
pub struct Config {
    /// The address to bind the HTTP server to
    pub bind_address: String,

    /// The port to bind the HTTP server to
    pub port: u16,

    /// Directory holding the day-partitioned audit log files
    pub log_dir: String,

    /// Directory served as static files (the contact form itself lives here)
    pub static_dir: String,

    pub mail_adapter: MailAdapter,

    /// SMTP relay host, used when `mail_adapter` is `smtp`
    pub smtp_host: String,

    pub smtp_port: u16,

    /// Mail account identity. Optional at load time; verification reports it.
    pub email_user: Option<String>,

    /// Mail account credential. Never logged.
    pub email_pass: Option<String>,

    /// Every relayed message goes here, never to a submitter-chosen address
    pub recipient_email: Option<String>,
}

// Hand-written so the credential never reaches a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("log_dir", &self.log_dir)
            .field("static_dir", &self.static_dir)
            .field("mail_adapter", &self.mail_adapter)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("email_user", &self.email_user)
            .field("email_pass", &self.email_pass.as_ref().map(|_| "<redacted>"))
            .field("recipient_email", &self.recipient_email)
            .finish()
    }
}

/// Reads an optional variable, falling back to `default` and logging whichever value wins.
fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .map(|val| {
            log::info!("Config: Using {} from env: {}", name, val);
            val
        })
        .unwrap_or_else(|_| {
            log::info!("Config: Using default {}: {}", name, default);
            default.to_string()
        })
}

/// Reads a variable that may be absent. Empty values count as absent.
fn optional_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => {
            log::warn!("Config: {} is not set", name);
            None
        }
    }
}

fn port_var(name: &str, default: &str) -> Result<u16> {
    let port_str = env::var(name).unwrap_or_else(|_| default.to_string());
    match port_str.parse::<u16>() {
        Ok(port) => {
            log::info!("Config: Using {}: {}", name, port);
            Ok(port)
        }
        Err(e) => {
            let err_msg = format!("{} ('{}') must be a valid port number", name, port_str);
            log::error!("{}: {}", err_msg, e);
            Err(anyhow!(e).context(err_msg))
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Mail credentials and the recipient are optional here: a service without
    /// them still serves the form and the log viewer, and the startup
    /// verification records the problem in the audit log.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (optional)
        let _ = dotenv::dotenv();

        let bind_address = var_or("CONTACT_RELAY_BIND_ADDRESS", "0.0.0.0");
        let port = port_var("CONTACT_RELAY_PORT", "3000")?;
        let log_dir = var_or("CONTACT_RELAY_LOG_DIR", "logs");
        let static_dir = var_or("CONTACT_RELAY_STATIC_DIR", ".");

        let adapter_str = var_or("CONTACT_RELAY_MAIL_ADAPTER", "smtp");
        let mail_adapter = match adapter_str.parse::<MailAdapter>() {
            Ok(adapter) => adapter,
            Err(e) => {
                let err_msg = format!(
                    "CONTACT_RELAY_MAIL_ADAPTER ('{}') must be 'smtp' or 'console'",
                    adapter_str
                );
                log::error!("{}: {}", err_msg, e);
                return Err(e.context(err_msg));
            }
        };

        let smtp_host = var_or("CONTACT_RELAY_SMTP_HOST", "smtp.gmail.com");
        let smtp_port = port_var("CONTACT_RELAY_SMTP_PORT", "587")?;

        let email_user = optional_var("CONTACT_RELAY_EMAIL_USER");
        let email_pass = optional_var("CONTACT_RELAY_EMAIL_PASS");
        let recipient_email = optional_var("CONTACT_RELAY_RECIPIENT_EMAIL");

        let config = Config {
            bind_address,
            port,
            log_dir,
            static_dir,
            mail_adapter,
            smtp_host,
            smtp_port,
            email_user,
            email_pass,
            recipient_email,
        };
        log::debug!("Config loaded: {:?}", config);

        Ok(config)
    }

    /// The `host:port` string the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Config for tests: console mailer, logs under `log_dir`.
    pub fn for_tests(log_dir: impl Into<String>) -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            log_dir: log_dir.into(),
            static_dir: ".".to_string(),
            mail_adapter: MailAdapter::Console,
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            email_user: None,
            email_pass: None,
            recipient_email: Some("owner@example.com".to_string()),
        }
    }
}

#[cfg(test)]
mod tests;
