use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::config::RelayConfig;
use crate::error::RelayError;

pub const API_SECRET_HEADER: &str = "X-API-Secret";

// ── Client IP ──

/// Real client IP, used for logging only.
/// Checks headers in priority order:
///   1. CF-Connecting-IP (Cloudflare)
///   2. True-Client-IP (Cloudflare Enterprise / Akamai)
///   3. X-Real-IP (nginx proxy_set_header)
///   4. X-Forwarded-For (first IP in the chain = original client)
///   5. Rocket's client_ip() (socket peer address)
pub fn client_ip(request: &Request<'_>) -> String {
    let headers = request.headers();

    for name in ["CF-Connecting-IP", "True-Client-IP", "X-Real-IP"] {
        if let Some(ip) = headers.get_one(name) {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    // X-Forwarded-For: client, proxy1, proxy2; the leftmost entry is the client
    if let Some(forwarded) = headers.get_one("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    request
        .client_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ── Shared secret guard ──

/// Guard: the request carries the configured shared secret, or no secret
/// is configured. Fails with 401 before the handler or its body runs.
pub struct ApiSecret;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiSecret {
    type Error = RelayError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.rocket().state::<RelayConfig>() {
            Some(c) => c,
            None => {
                return Outcome::Error((
                    Status::InternalServerError,
                    RelayError::Unexpected("relay configuration is not loaded".into()),
                ))
            }
        };

        let provided = request.headers().get_one(API_SECRET_HEADER);
        if secret_matches(config.api_secret.as_deref(), provided) {
            Outcome::Success(ApiSecret)
        } else {
            log::warn!("Unauthorized request from {}", client_ip(request));
            Outcome::Error((Status::Unauthorized, RelayError::Unauthorized))
        }
    }
}

/// Exact, case-sensitive comparison. An unset or empty secret admits everyone.
pub fn secret_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match expected {
        None | Some("") => true,
        Some(secret) => provided == Some(secret),
    }
}
