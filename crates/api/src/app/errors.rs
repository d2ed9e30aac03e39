use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use eventhub_core::EventId;
use eventhub_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
        ServiceError::AlreadyRegistered => json_error(
            StatusCode::CONFLICT,
            "already_registered",
            "User already registered for this event",
        ),
        ServiceError::NotRegistered => json_error(
            StatusCode::NOT_FOUND,
            "not_registered",
            "User is not registered for this event",
        ),
        ServiceError::InvalidCapacity(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_capacity", msg)
        }
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::EmailTaken => json_error(
            StatusCode::CONFLICT,
            "email_taken",
            "An account with this email already exists",
        ),
        ServiceError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid email or password",
        ),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "Could not complete the request, try again later",
            )
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Could not complete the request, try again later",
            )
        }
    }
}

/// Malformed or unreadable JSON bodies are a client error.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "invalid_request",
        format!("Could not parse request data: {}", rejection.body_text()),
    )
}

pub fn parse_event_id(raw: &str) -> Result<EventId, axum::response::Response> {
    raw.parse::<EventId>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "Could not parse event id"))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
