use crate::handlers::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Extension, Json};
use sqlx::pool::PoolConnection;
use sqlx::Postgres;
use std::future::Future;
use std::sync::Arc;
use stockify_models::{NewProduct, Product};
use stockify_tenant::TenantContext;

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// List the bound tenant's products.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Product>>, HandlerError> {
    with_tenant_connection(&state, &ctx, |mut conn| async move {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM product WHERE is_active = TRUE ORDER BY sku",
        )
        .fetch_all(&mut *conn)
        .await;
        (products, conn)
    })
    .await
    .map(Json)
}

/// Products at or below their low-stock threshold.
pub async fn low_stock_products(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Product>>, HandlerError> {
    with_tenant_connection(&state, &ctx, |mut conn| async move {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM product
             WHERE is_active = TRUE AND stock_level <= low_stock_threshold
             ORDER BY stock_level",
        )
        .fetch_all(&mut *conn)
        .await;
        (products, conn)
    })
    .await
    .map(Json)
}

/// Create a product in the bound tenant's schema.
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<TenantContext>,
    Json(new_product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), HandlerError> {
    let product = with_tenant_connection(&state, &ctx, |mut conn| async move {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO product
                 (sku, title, description, category, price, stock_level, low_stock_threshold)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&new_product.sku)
        .bind(&new_product.title)
        .bind(&new_product.description)
        .bind(&new_product.category)
        .bind(new_product.price)
        .bind(new_product.stock_level)
        .bind(new_product.low_stock_threshold)
        .fetch_one(&mut *conn)
        .await;
        (product, conn)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Checks out a tenant-scoped connection, runs `f` on it, and always hands
/// the connection back to the provider for a schema reset. The closure
/// returns the connection so the release is unconditional even when the
/// query fails.
async fn with_tenant_connection<T, F, Fut>(
    state: &AppState,
    ctx: &TenantContext,
    f: F,
) -> Result<T, HandlerError>
where
    F: FnOnce(PoolConnection<Postgres>) -> Fut,
    Fut: Future<Output = (sqlx::Result<T>, PoolConnection<Postgres>)>,
{
    let tenant = state.resolver.resolve(ctx);
    let conn = state
        .provider
        .get_connection(Some(&tenant))
        .await
        .map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "Connection checkout failed");
            internal_error()
        })?;

    let (outcome, conn) = f(conn).await;

    state
        .provider
        .release_connection(conn)
        .await
        .map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "Connection release failed");
            internal_error()
        })?;

    outcome.map_err(|e| {
        tracing::error!(tenant = %tenant, error = %e, "Query failed");
        internal_error()
    })
}

fn internal_error() -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal_error", "Internal server error")),
    )
}
