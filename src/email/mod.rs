pub mod smtp;

use std::fmt;
use std::str::FromStr;

use lettre::address::AddressError;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};
use serde::Deserialize;
use serde_json::Value;

use crate::config::RelayConfig;
use crate::error::RelayError;

/// JSON body accepted by `POST /send`.
#[derive(Debug, Default, Deserialize)]
pub struct SendRequest {
    pub to: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub reply_to_name: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

impl SendRequest {
    /// Decode a request body. Anything other than a non-empty JSON object
    /// counts as no data at all.
    pub fn from_json(value: Value) -> Result<Self, RelayError> {
        match &value {
            Value::Object(map) if !map.is_empty() => {}
            _ => return Err(RelayError::NoData),
        }
        serde_json::from_value(value)
            .map_err(|e| RelayError::Validation(ValidationError::Malformed(e.to_string())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingSubject,
    MissingContent,
    InvalidAddress { field: &'static str, detail: String },
    Malformed(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingSubject => f.write_str("Subject is required"),
            ValidationError::MissingContent => {
                f.write_str("Either html or text content is required")
            }
            ValidationError::InvalidAddress { field, detail } => {
                write!(f, "Invalid {} address: {}", field, detail)
            }
            ValidationError::Malformed(detail) => write!(f, "Invalid request body: {}", detail),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Message content. There is always at least one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Html(String),
    Alternative { text: String, html: String },
}

impl Body {
    /// `multipart/alternative` with the plain part ahead of the html part,
    /// so clients that understand html prefer it.
    fn to_multipart(&self) -> MultiPart {
        match self {
            Body::Text(text) => MultiPart::alternative().singlepart(SinglePart::plain(text.clone())),
            Body::Html(html) => MultiPart::alternative().singlepart(SinglePart::html(html.clone())),
            Body::Alternative { text, html } => {
                MultiPart::alternative_plain_html(text.clone(), html.clone())
            }
        }
    }
}

/// A send request with every default resolved, ready for the SMTP transport.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub body: Body,
}

impl OutboundMessage {
    /// Bad request fields are the caller's fault (400). A bad configured
    /// default is a server fault and surfaces as `Unexpected` (500).
    pub fn build(req: &SendRequest, config: &RelayConfig) -> Result<Self, RelayError> {
        let subject = present(&req.subject).ok_or(ValidationError::MissingSubject)?;

        let body = match (present(&req.text), present(&req.html)) {
            (Some(text), Some(html)) => Body::Alternative {
                text: text.to_string(),
                html: html.to_string(),
            },
            (Some(text), None) => Body::Text(text.to_string()),
            (None, Some(html)) => Body::Html(html.to_string()),
            (None, None) => return Err(ValidationError::MissingContent.into()),
        };

        let to = match present(&req.to) {
            Some(raw) => parse_mailbox("to", raw)?,
            None => parse_default("DEFAULT_TO", &config.default_to)?,
        };

        let from_address = match present(&req.from_email) {
            Some(raw) => parse_address("from_email", raw)?,
            None => parse_default("DEFAULT_FROM", &config.default_from)?,
        };
        let from_name = present(&req.from_name).unwrap_or(config.sender_name.as_str());
        let from = Mailbox::new(Some(from_name.to_string()), from_address);

        let reply_to = match present(&req.reply_to) {
            Some(addr) => Some(match present(&req.reply_to_name) {
                Some(name) => Mailbox::new(Some(name.to_string()), parse_address("reply_to", addr)?),
                None => parse_mailbox("reply_to", addr)?,
            }),
            None => None,
        };

        Ok(OutboundMessage {
            from,
            to,
            reply_to,
            subject: subject.to_string(),
            body,
        })
    }

    /// Serialize into a lettre message. The SMTP envelope is derived from
    /// the From and To headers.
    pub fn to_message(&self) -> Result<Message, lettre::error::Error> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone());
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }
        builder.multipart(self.body.to_multipart())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_default<T>(setting: &'static str, raw: &str) -> Result<T, RelayError>
where
    T: FromStr<Err = AddressError>,
{
    raw.trim().parse().map_err(|e: AddressError| {
        log::error!("{} is not a valid address: {}", setting, e);
        RelayError::Unexpected(format!("Invalid {} setting: {}", setting, e))
    })
}

fn parse_address(field: &'static str, raw: &str) -> Result<Address, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|e: AddressError| ValidationError::InvalidAddress {
            field,
            detail: e.to_string(),
        })
}

fn parse_mailbox(field: &'static str, raw: &str) -> Result<Mailbox, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|e: AddressError| ValidationError::InvalidAddress {
            field,
            detail: e.to_string(),
        })
}
