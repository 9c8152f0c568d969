//! Admin password gate
//!
//! Every admin request carries the shared password in the
//! `x-admin-password` header. There are no sessions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::post,
    Json, Router,
};
use infobytes_common::store::ADMIN_PASSWORD_HEADER;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ApiError, ApiResult, AppState};

const ADMIN_DISABLED: &str = "Admin API is disabled (ADMIN_PASSWORD not set)";

/// Reject admin requests without the right password
///
/// 403 when no admin password is configured, 401 when the header is
/// missing or wrong.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.admin_enabled() {
        return Err(ApiError::Forbidden(ADMIN_DISABLED.to_string()));
    }

    let supplied = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.check_admin_password(supplied) {
        warn!("Rejected admin request to {}", request.uri().path());
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
}

/// POST /admin/login
///
/// Lets the admin UI check a password before storing it client-side.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if !state.admin_enabled() {
        return Err(ApiError::Forbidden(ADMIN_DISABLED.to_string()));
    }
    if !state.check_admin_password(&body.password) {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(LoginResponse { success: true }))
}

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/admin/login", post(login))
}
