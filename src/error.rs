use std::fmt;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::json;

use crate::email::smtp::SmtpError;
use crate::email::ValidationError;

/// Every way a relay request can fail. Rendered as `{"error": "..."}`.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayError {
    Unauthorized,
    NoData,
    Validation(ValidationError),
    Smtp(SmtpError),
    Unexpected(String),
}

impl RelayError {
    pub fn status(&self) -> Status {
        match self {
            RelayError::Unauthorized => Status::Unauthorized,
            RelayError::NoData | RelayError::Validation(_) => Status::BadRequest,
            RelayError::Smtp(_) | RelayError::Unexpected(_) => Status::InternalServerError,
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Unauthorized => f.write_str("Unauthorized"),
            RelayError::NoData => f.write_str("No JSON data provided"),
            RelayError::Validation(e) => write!(f, "{}", e),
            RelayError::Smtp(e) => write!(f, "SMTP error: {}", e),
            RelayError::Unexpected(detail) => f.write_str(detail),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<ValidationError> for RelayError {
    fn from(e: ValidationError) -> Self {
        RelayError::Validation(e)
    }
}

impl From<SmtpError> for RelayError {
    fn from(e: SmtpError) -> Self {
        RelayError::Smtp(e)
    }
}

impl From<lettre::error::Error> for RelayError {
    fn from(e: lettre::error::Error) -> Self {
        RelayError::Unexpected(e.to_string())
    }
}

impl<'r> Responder<'r, 'static> for RelayError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(RelayError::Unauthorized.status(), Status::Unauthorized);
        assert_eq!(RelayError::NoData.status(), Status::BadRequest);
        assert_eq!(
            RelayError::Validation(ValidationError::MissingSubject).status(),
            Status::BadRequest
        );
        assert_eq!(
            RelayError::Smtp(SmtpError::new("connection refused")).status(),
            Status::InternalServerError
        );
        assert_eq!(
            RelayError::Unexpected("boom".into()).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn smtp_errors_are_prefixed() {
        let e = RelayError::Smtp(SmtpError::new("554 relay denied"));
        assert_eq!(e.to_string(), "SMTP error: 554 relay denied");
    }

    #[test]
    fn unexpected_errors_pass_detail_through() {
        assert_eq!(RelayError::Unexpected("boom".into()).to_string(), "boom");
    }
}
