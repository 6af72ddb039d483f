use crate::handlers::ErrorResponse;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use stockify_tenant::{
    extract_from_fallbacks, extract_from_header_or_form, FallbackParts, TenantContext,
};

pub const TENANT_HEADER: &str = "x-tenantid";
const LOGIN_FORM_FIELD: &str = "tenant_id";
const LOGIN_BODY_LIMIT: usize = 64 * 1024;

/// Early binding layer. Creates one fresh `TenantContext` per request, binds
/// the tenant extracted from the `X-TenantId` header (or, on the
/// login-submission path, from the `tenant_id` form field), stores the
/// handle in request extensions, and clears it after the response on every
/// path. The login handler runs inside this scope, so the binding stays
/// alive through authentication and is still cleared exactly once.
///
/// When neither source carries a value the context is left unbound for the
/// fallback layer. A value that is present but not a valid identifier is
/// rejected with 404 here, before any fallback can substitute the default
/// tenant.
pub async fn tenant_binding(
    State(_state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let header = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut request = request;
    let mut form_tenant = None;
    if header.as_deref().map_or(true, |h| h.trim().is_empty()) && is_login_submission(&request) {
        let (sniffed, restored) = sniff_login_form(request).await?;
        form_tenant = sniffed;
        request = restored;
        if let Some(t) = &form_tenant {
            tracing::debug!(tenant = %t, "Login request, tenant taken from form field");
        }
    }

    let ctx = TenantContext::new();
    match extract_from_header_or_form(header.as_deref(), form_tenant.as_deref()) {
        Ok(Some(tenant)) => {
            // Fresh context: the bind cannot fail.
            ctx.bind(tenant).map_err(|e| {
                tracing::error!(error = %e, "Tenant bind failed on fresh context");
                internal_error()
            })?;
        }
        Ok(None) => {}
        // An asserted but invalid identifier is rejected outright, never
        // downgraded to the default tenant.
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed tenant identifier");
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("tenant_not_found", "Tenant not found")),
            ));
        }
    }
    request.extensions_mut().insert(ctx.clone());

    let response = next.run(request).await;
    ctx.clear();
    Ok(response)
}

/// Secondary resolution layer, consulted only when the header/form layer
/// left the context unbound: subdomain, then `/tenant/{id}` path segment,
/// then `tenantId` query parameter, then the registry default. After this
/// layer the context is always bound.
pub async fn tenant_fallback(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let ctx = request
        .extensions()
        .get::<TenantContext>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("Tenant context missing from request extensions");
            internal_error()
        })?;

    if !ctx.is_bound() {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok());
        let parts = FallbackParts {
            host,
            path: request.uri().path(),
            query: request.uri().query(),
        };
        let tenant = extract_from_fallbacks(&parts)
            .unwrap_or_else(|| state.registry.default_tenant().clone());
        ctx.bind(tenant).map_err(|e| {
            tracing::error!(error = %e, "Tenant bind failed in fallback layer");
            internal_error()
        })?;
    }

    Ok(next.run(request).await)
}

fn is_login_submission(request: &Request) -> bool {
    request.method() == Method::POST && request.uri().path() == "/login"
}

/// Buffers the login form body, pulls out the tenant field, and restores the
/// body so the login handler can still deserialize it.
async fn sniff_login_form(
    request: Request,
) -> Result<(Option<String>, Request), (StatusCode, Json<ErrorResponse>)> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, LOGIN_BODY_LIMIT)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to buffer login body");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("invalid_body", "Could not read request body")),
            )
        })?;

    let tenant = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
        .ok()
        .and_then(|pairs| {
            pairs
                .into_iter()
                .find(|(k, v)| k == LOGIN_FORM_FIELD && !v.trim().is_empty())
                .map(|(_, v)| v)
        });

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok((tenant, request))
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal_error", "Internal server error")),
    )
}
