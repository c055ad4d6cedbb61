use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::ValidationErrors;

/// Body of every error response
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    /// Detail of an unexpected server failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

fn bad_request(error: String) -> actix_web::Error {
    actix_web::error::InternalError::from_response(
        "",
        HttpResponse::BadRequest().json(ErrorResponse::new(error)),
    )
    .into()
}

/// First human readable message of a failed validation
pub fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Validation failed".to_string())
}

fn describe_body_error(err_string: &str) -> String {
    if err_string.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload".to_string()
    } else if err_string.contains("Content type error") {
        "Expected a JSON request body".to_string()
    } else if err_string.contains("invalid type") {
        "Invalid field type. Text fields must be strings".to_string()
    } else {
        "Invalid JSON format".to_string()
    }
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config(max_payload_size: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(|err, req| {
            let error = match err {
                actix_web_validator::Error::Validate(validation_errors) => {
                    first_message(&validation_errors)
                }
                actix_web_validator::Error::Deserialize(de_err) => describe_body_error(&de_err.to_string()),
                actix_web_validator::Error::JsonPayloadError(payload_err) => {
                    describe_body_error(&payload_err.to_string())
                }
                _ => "Validation failed".to_string(),
            };

            warn!("Rejected request body for {} {}: {}", req.method(), req.path(), error);
            bad_request(error)
        })
}

/// Non-numeric job ids are reported like unknown ids
pub fn path_config() -> actix_web::web::PathConfig {
    actix_web::web::PathConfig::default().error_handler(|_err, _req: &HttpRequest| {
        actix_web::error::InternalError::from_response(
            "",
            HttpResponse::NotFound().json(ErrorResponse::new("Job not found")),
        )
        .into()
    })
}

/// Malformed query strings on `GET /jobs`
pub fn query_config() -> actix_web::web::QueryConfig {
    actix_web::web::QueryConfig::default().error_handler(|err, _req| {
        bad_request(format!("Invalid query string: {}", err))
    })
}
