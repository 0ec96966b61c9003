use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SMTP_HOST: &str = "mail.flatironnetworks.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_TO: &str = "contact@llmappliance.com";
pub const DEFAULT_FROM: &str = "noreply@llmappliance.com";
pub const DEFAULT_FROM_NAME: &str = "LLM Appliance Contact Form";
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// Process-wide relay settings, read once at startup and managed as Rocket state.
#[derive(Clone)]
pub struct RelayConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub use_tls: bool,
    /// Shared secret expected in `X-API-Secret`. `None` disables the check.
    pub api_secret: Option<String>,
    pub default_to: String,
    pub default_from: String,
    /// Display name used when a request has no `from_name`.
    pub sender_name: String,
    pub smtp_timeout: Duration,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Missing or blank
    /// values fall back to their defaults. `API_SECRET` is taken verbatim:
    /// only an empty value disables the check.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Invalid SMTP_PORT {:?}, using {}", raw, DEFAULT_SMTP_PORT);
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };

        let timeout_secs = match get("SMTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!(
                    "Invalid SMTP_TIMEOUT_SECS {:?}, using {}",
                    raw,
                    DEFAULT_SMTP_TIMEOUT_SECS
                );
                DEFAULT_SMTP_TIMEOUT_SECS
            }),
            None => DEFAULT_SMTP_TIMEOUT_SECS,
        };

        RelayConfig {
            smtp_host: get_or("SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port,
            smtp_user: get("SMTP_USER"),
            smtp_pass: get("SMTP_PASS"),
            use_tls: get("SMTP_USE_TLS")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            api_secret: lookup("API_SECRET").filter(|v| !v.is_empty()),
            default_to: get_or("DEFAULT_TO", DEFAULT_TO),
            default_from: get_or("DEFAULT_FROM", DEFAULT_FROM),
            sender_name: get_or("DEFAULT_FROM_NAME", DEFAULT_FROM_NAME),
            smtp_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// SMTP credentials, only when both user and password are set.
    pub fn smtp_credentials(&self) -> Option<(&str, &str)> {
        match (self.smtp_user.as_deref(), self.smtp_pass.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// Secrets stay out of logs.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("RelayConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &redact(&self.smtp_pass))
            .field("use_tls", &self.use_tls)
            .field("api_secret", &redact(&self.api_secret))
            .field("default_to", &self.default_to)
            .field("default_from", &self.default_from)
            .field("sender_name", &self.sender_name)
            .field("smtp_timeout", &self.smtp_timeout)
            .finish()
    }
}
