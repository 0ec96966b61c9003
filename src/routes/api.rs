use rocket::serde::json::{Error as JsonError, Json};
use rocket::State;
use serde_json::{json, Value};

use crate::config::RelayConfig;
use crate::email::smtp::Mailer;
use crate::email::{OutboundMessage, SendRequest};
use crate::error::RelayError;
use crate::security::auth::ApiSecret;

// ── Send ───────────────────────────────────────────────

/// Relay one message. The body is read only after `ApiSecret` has passed.
#[post("/send", data = "<body>")]
pub async fn send(
    _secret: ApiSecret,
    config: &State<RelayConfig>,
    mailer: &State<Box<dyn Mailer>>,
    body: Result<Json<Value>, JsonError<'_>>,
) -> Result<Json<Value>, RelayError> {
    let payload = match body {
        Ok(Json(value)) => value,
        Err(e) => {
            log::warn!("Rejected request body: {}", e);
            return Err(RelayError::NoData);
        }
    };

    let request = SendRequest::from_json(payload)?;
    let outbound = OutboundMessage::build(&request, config)?;

    log::info!(
        "Sending email to {} with subject: {}",
        outbound.to,
        outbound.subject
    );

    let email = outbound.to_message().map_err(|e| {
        log::error!("Error sending email: {}", e);
        RelayError::from(e)
    })?;

    if let Err(e) = mailer.send(email).await {
        log::error!("SMTP error: {}", e);
        return Err(RelayError::Smtp(e));
    }

    log::info!("Email sent successfully to {}", outbound.to);
    Ok(Json(json!({"success": true, "message": "Email sent successfully"})))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![send]
}
