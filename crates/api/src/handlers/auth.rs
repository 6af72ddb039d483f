use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stockify_models::AppUser;
use stockify_tenant::TenantContext;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Consumed by the binding middleware before the handler runs; kept here
    /// so form deserialization accepts it.
    #[serde(default)]
    #[allow(dead_code)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: String,
    pub tenant: String,
}

/// Form login against the bound tenant's user table. The tenant binding was
/// established by the middleware (header, or the `tenant_id` form field on
/// this path) and stays alive for the whole handler.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
    Form(request): Form<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let tenant = state.resolver.resolve(&ctx);

    let mut conn = state
        .provider
        .get_connection(Some(&tenant))
        .await
        .map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "Connection checkout failed");
            internal_error()
        })?;

    let outcome = authenticate(&mut conn, &request).await;

    state
        .provider
        .release_connection(conn)
        .await
        .map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "Connection release failed");
            internal_error()
        })?;

    let user = outcome?;
    tracing::info!(tenant = %tenant, username = %user.username, "Login succeeded");
    Ok(Json(LoginResponse {
        username: user.username,
        role: user.role.as_str().to_string(),
        tenant: tenant.to_string(),
    }))
}

async fn authenticate(
    conn: &mut sqlx::pool::PoolConnection<sqlx::Postgres>,
    request: &LoginRequest,
) -> Result<AppUser, (StatusCode, Json<ErrorResponse>)> {
    let user: Option<AppUser> =
        sqlx::query_as("SELECT * FROM app_user WHERE username = $1 AND is_active = TRUE")
            .bind(&request.username)
            .fetch_optional(&mut **conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "User lookup failed");
                internal_error()
            })?;

    let user = user.ok_or_else(invalid_credentials)?;

    let valid = bcrypt::verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, "Password verification failed");
        internal_error()
    })?;
    if !valid {
        return Err(invalid_credentials());
    }

    sqlx::query("UPDATE app_user SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&mut **conn)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record login time");
            internal_error()
        })?;

    Ok(user)
}

fn invalid_credentials() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            "invalid_credentials",
            "Invalid username or password",
        )),
    )
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal_error", "Internal server error")),
    )
}
