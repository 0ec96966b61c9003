use std::fmt;
use std::time::Duration;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rocket::tokio::time;

use crate::config::RelayConfig;

/// Any failure while talking to the upstream server: connect, STARTTLS,
/// auth or the send itself. Carries the transport's error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpError(String);

impl SmtpError {
    pub fn new(detail: impl Into<String>) -> Self {
        SmtpError(detail.into())
    }
}

impl fmt::Display for SmtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SmtpError {}

impl From<lettre::transport::smtp::Error> for SmtpError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        SmtpError::new(e.to_string())
    }
}

/// Delivers a finished message to the next hop.
#[rocket::async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: Message) -> Result<(), SmtpError>;
}

/// Relays through the configured upstream server. Every call opens its own
/// connection and closes it when the send finishes or fails.
pub struct SmtpRelay {
    host: String,
    port: u16,
    use_tls: bool,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl SmtpRelay {
    pub fn new(config: &RelayConfig) -> Self {
        SmtpRelay {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            use_tls: config.use_tls,
            credentials: config
                .smtp_credentials()
                .map(|(user, pass)| Credentials::new(user.to_string(), pass.to_string())),
            timeout: config.smtp_timeout,
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, SmtpError> {
        let builder = if self.use_tls {
            // STARTTLS is required before AUTH or MAIL.
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
        };

        let mut builder = builder.port(self.port).timeout(Some(self.timeout));
        if let Some(creds) = &self.credentials {
            builder = builder.credentials(creds.clone());
        }
        Ok(builder.build())
    }
}

#[rocket::async_trait]
impl Mailer for SmtpRelay {
    /// `timeout` bounds the whole exchange, including an upstream that
    /// accepts the connection and then goes silent.
    async fn send(&self, email: Message) -> Result<(), SmtpError> {
        let transport = self.transport()?;
        match time::timeout(self.timeout, transport.send(email)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(SmtpError::new(format!(
                "timed out after {}s talking to {}:{}",
                self.timeout.as_secs(),
                self.host,
                self.port
            ))),
        }
    }
}
