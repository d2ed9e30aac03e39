use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The authenticated account, read live from the credential store.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.accounts.find_user(principal.user_id()).await {
        Ok(user) => Json(json!({
            "userId": user.id,
            "email": user.email,
            "role": user.role,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
