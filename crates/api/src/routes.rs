use crate::handlers;
use crate::middleware;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Protected routes: tenant existence is validated before any handler.
    let protected = Router::new()
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/low-stock",
            get(handlers::products::low_stock_products),
        )
        .route("/api/tenants/current", get(handlers::tenant::current_tenant))
        .route_layer(from_fn_with_state(state.clone(), middleware::tenant_guard));

    Router::new()
        // Health check (no tenant semantics)
        .route("/health", get(handlers::health::health_check))
        // Login: tenant comes from header or the tenant_id form field
        .route("/login", post(handlers::auth::login))
        .merge(protected)
        // Outermost layer runs first: binding, then fallback resolution.
        .layer(from_fn_with_state(state.clone(), middleware::tenant_fallback))
        .layer(from_fn_with_state(state.clone(), middleware::tenant_binding))
        .with_state(state)
}
