// Stockify API Server
// Multi-tenant inventory backend: one Postgres schema per tenant.

mod config;
mod handlers;
mod middleware;
mod routes;

use config::Config;
use dotenvy::dotenv;
use std::sync::Arc;
use stockify_database::{
    embedded_migrations, Database, SchemaConnectionProvider, SchemaMigrationRunner,
    TenantExistenceValidator,
};
use stockify_seed::SeedRunner;
use stockify_tenant::{TenantRegistry, TenantResolver};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub struct AppState {
    pub database: Database,
    pub registry: TenantRegistry,
    pub resolver: TenantResolver,
    pub provider: SchemaConnectionProvider,
    pub validator: TenantExistenceValidator,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,stockify_api=debug,tower_http=debug".to_string()),
        )
        .init();

    tracing::info!("🚀 Starting Stockify API Server");
    tracing::info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env();
    tracing::info!("🔌 Server: {}:{}", config.server_host, config.server_port);

    let registry = TenantRegistry::from_env()?;
    tracing::info!(
        "🏢 Tenants: {} registered, default '{}', platform '{}'",
        registry.tenants().len(),
        registry.default_tenant(),
        registry.platform_tenant()
    );

    // Initialize database
    tracing::info!("🗄️  Connecting to database...");
    let database = Database::new(config.database.clone()).await?;
    database.ping().await?;
    tracing::info!("✅ Database connected");

    // Migrate every tenant schema. Any failure is fatal: the server must not
    // start against a partially-migrated tenant set.
    tracing::info!("🏗️  Running schema migrations...");
    let runner = SchemaMigrationRunner::new(database.pool().clone(), embedded_migrations())
        .with_repair(config.migrate_repair);
    let report = runner.run(&registry).await?;
    tracing::info!(
        "✅ Migrated {} schemas ({} scripts applied)",
        report.schemas,
        report.applied
    );

    let provider =
        SchemaConnectionProvider::new(database.pool().clone(), registry.default_tenant().clone());
    let resolver = TenantResolver::new(&registry);
    let validator =
        TenantExistenceValidator::new(database.pool().clone(), registry.default_tenant().clone());

    // Seed baseline data. Best-effort: failures are logged per tenant and
    // never abort startup.
    tracing::info!("🌱 Seeding tenant baseline data...");
    let seed_report = SeedRunner::new(provider.clone(), registry.clone())
        .run()
        .await;
    tracing::info!(
        "✅ Seeding done: {} seeded, {} skipped, {} failed",
        seed_report.seeded,
        seed_report.skipped,
        seed_report.failed
    );

    // Create app state
    let state = Arc::new(AppState {
        database,
        registry,
        resolver,
        provider,
        validator,
    });

    // Create router
    let app = routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("✅ Server ready at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
