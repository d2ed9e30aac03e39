use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route(
        "/events/:id/register",
        post(register).delete(cancel).get(status),
    )
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.events.register(event_id, principal.user_id()).await {
        Ok(registration) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Registered for event successfully",
                "eventId": registration.event_id,
                "userId": registration.user_id,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn cancel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .events
        .cancel_registration(event_id, principal.user_id())
        .await
    {
        Ok(()) => Json(json!({"message": "Cancelled successfully"})).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .events
        .registration_status(event_id, principal.user_id())
        .await
    {
        Ok(state) => Json(json!({
            "eventId": event_id,
            "registered": state.is_registered(),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
