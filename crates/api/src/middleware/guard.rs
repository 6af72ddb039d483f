use crate::handlers::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use stockify_tenant::TenantContext;

/// Validation layer for protected routes. Confirms that the asserted tenant
/// schema actually exists before any business handler runs; the default
/// tenant is exempt. Rejections short-circuit with a structured body.
pub async fn tenant_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let ctx = request
        .extensions()
        .get::<TenantContext>()
        .cloned()
        .unwrap_or_default();
    let tenant = state.resolver.resolve(&ctx);

    if !state.registry.is_default(&tenant) {
        match state.validator.exists(&tenant).await {
            Ok(true) => {
                tracing::debug!(tenant = %tenant, "Tenant validated");
            }
            Ok(false) => {
                tracing::warn!(tenant = %tenant, "Rejected request for unknown tenant");
                return Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new("tenant_not_found", "Tenant not found")),
                ));
            }
            Err(e) => {
                tracing::error!(tenant = %tenant, error = %e, "Tenant validation failed");
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("internal_error", "Internal server error")),
                ));
            }
        }
    }

    Ok(next.run(request).await)
}
