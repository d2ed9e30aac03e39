use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use serde_json::json;

use eventhub_auth::Credentials;

use crate::app::dto::{ChangePasswordRequest, UserResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Signup and login; no token required.
pub fn public_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn router() -> Router {
    Router::new().route("/users/password", put(change_password))
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> axum::response::Response {
    let Json(credentials) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.accounts.signup(credentials).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User created successfully",
                "user": UserResponse::from(user),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> axum::response::Response {
    let Json(credentials) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.accounts.login(credentials).await {
        Ok(session) => Json(json!({
            "message": "Login successful",
            "token": session.token,
            "role": session.user.role,
            "email": session.user.email,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .accounts
        .change_password(principal.user_id(), &body.new_password)
        .await
    {
        Ok(()) => Json(json!({"message": "Password updated successfully"})).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
