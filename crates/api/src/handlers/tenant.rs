use crate::handlers::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use stockify_tenant::TenantContext;

#[derive(Debug, Serialize)]
pub struct CurrentTenantResponse {
    pub tenant: String,
    pub display_name: String,
    pub is_active: bool,
    pub schema_well_formed: bool,
}

/// Reports the tenant the current request resolved to, as the business
/// handlers see it.
pub async fn current_tenant(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<CurrentTenantResponse>, (StatusCode, Json<ErrorResponse>)> {
    let tenant = state.resolver.resolve(&ctx);

    let is_active = state.validator.is_active(&tenant).await.map_err(|e| {
        tracing::error!(tenant = %tenant, error = %e, "Activity check failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("internal_error", "Internal server error")),
        )
    })?;
    let schema_well_formed = state
        .validator
        .schema_is_well_formed(&tenant)
        .await
        .map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "Well-formedness check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal_error", "Internal server error")),
            )
        })?;
    let display_name = state.validator.display_name(&tenant).await;

    Ok(Json(CurrentTenantResponse {
        tenant: tenant.to_string(),
        display_name,
        is_active,
        schema_well_formed,
    }))
}
