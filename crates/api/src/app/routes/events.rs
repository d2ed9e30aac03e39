use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use crate::app::dto::{EventRequest, EventResponse, TicketCountRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Anonymous reads.
pub fn public_router() -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/:id", get(get_event))
}

/// Owner mutations; requires a [`PrincipalContext`].
pub fn router() -> Router {
    Router::new()
        .route("/events", axum::routing::post(create_event))
        .route("/events/:id", put(update_event).delete(delete_event))
        .route("/events/:id/tickets", put(update_tickets))
}

pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.events.list_events().await {
        Ok(events) => {
            let body: Vec<EventResponse> = events.into_iter().map(EventResponse::from).collect();
            Json(body).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.events.get_event(event_id).await {
        Ok(event) => Json(EventResponse::from(event)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .events
        .create_event(principal.user_id(), body.into())
        .await
    {
        Ok(event) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Event created successfully",
                "event": EventResponse::from(event),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .events
        .update_event(event_id, principal.user_id(), body.into())
        .await
    {
        Ok(event) => Json(json!({
            "message": "Event updated successfully",
            "event": EventResponse::from(event),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.events.delete_event(event_id, principal.user_id()).await {
        Ok(()) => Json(json!({"message": "Event deleted successfully"})).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_tickets(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<TicketCountRequest>, JsonRejection>,
) -> axum::response::Response {
    let event_id = match errors::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .events
        .update_ticket_count(event_id, principal.user_id(), body.tickets_available)
        .await
    {
        Ok(count) => Json(json!({
            "message": "Tickets updated successfully",
            "eventId": event_id,
            "ticketsAvailable": count.get(),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
