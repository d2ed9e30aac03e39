use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use eventhub_auth::{authenticate, AuthError, JwtValidator};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the bearer token to a [`PrincipalContext`] or answer 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| auth_error(AuthError::MissingToken))?;

    let user_id = authenticate(state.jwt.as_ref(), token, Utc::now()).map_err(auth_error)?;

    req.extensions_mut().insert(PrincipalContext::new(user_id));

    Ok(next.run(req).await)
}

fn auth_error(err: AuthError) -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
}

/// Token from the `Authorization` header. Both `Bearer <token>` and a bare
/// token are accepted; an empty value counts as missing.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}
