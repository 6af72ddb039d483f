// Bootstrap seeding: idempotently populate baseline accounts, sample catalog
// rows, and default configuration for every registered tenant. Runs after
// migrations at boot. Unlike migration, seeding is best-effort: a failing
// tenant is logged and skipped, never aborting the run.

pub mod data;

use data::{derived_company_name, SEED_CONFIG, SEED_PRODUCTS, SEED_USERS};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;
use std::str::FromStr;
use stockify_database::{DatabaseError, SchemaConnectionProvider};
use stockify_models::UserRole;
use stockify_tenant::{TenantContext, TenantRegistry, TenantResolver};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedingError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Invalid seed data: {0}")]
    Data(String),
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub seeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct SeedRunner {
    provider: SchemaConnectionProvider,
    registry: TenantRegistry,
    resolver: TenantResolver,
}

impl SeedRunner {
    pub fn new(provider: SchemaConnectionProvider, registry: TenantRegistry) -> Self {
        let resolver = TenantResolver::new(&registry);
        Self {
            provider,
            registry,
            resolver,
        }
    }

    /// Seeds every registered tenant. Each tenant gets its own context
    /// binding for the duration of its pass, cleared afterwards on every
    /// path.
    pub async fn run(&self) -> SeedReport {
        let mut report = SeedReport::default();

        for tenant in self.registry.tenants() {
            let ctx = TenantContext::new();
            if let Err(e) = ctx.bind(tenant.clone()) {
                // Fresh context, cannot already be bound.
                tracing::error!(tenant = %tenant, error = %e, "Seeding context bind failed");
                report.failed += 1;
                continue;
            }

            match self.seed_tenant(&ctx).await {
                Ok(true) => {
                    tracing::info!(tenant = %tenant, "Seeded tenant");
                    report.seeded += 1;
                }
                Ok(false) => {
                    tracing::info!(tenant = %tenant, "Tenant already seeded, skipping");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(tenant = %tenant, error = %e, "Seeding failed, skipping tenant");
                    report.failed += 1;
                }
            }
            ctx.clear();
        }

        tracing::info!(
            seeded = report.seeded,
            skipped = report.skipped,
            failed = report.failed,
            "Bootstrap seeding complete"
        );
        report
    }

    /// Returns `Ok(true)` when baseline data was written, `Ok(false)` when
    /// the tenant already had it.
    async fn seed_tenant(&self, ctx: &TenantContext) -> Result<bool, SeedingError> {
        let tenant = self.resolver.resolve(ctx);
        let mut conn = self.provider.get_connection(Some(&tenant)).await?;

        let outcome = self.seed_on(&mut conn, &tenant).await;
        let release = self.provider.release_connection(conn).await;

        let written = outcome?;
        release?;
        Ok(written)
    }

    async fn seed_on(
        &self,
        conn: &mut PoolConnection<Postgres>,
        tenant: &stockify_tenant::TenantId,
    ) -> Result<bool, SeedingError> {
        if self.admin_exists(conn).await? {
            return Ok(false);
        }

        self.create_users(conn).await?;
        self.create_products(conn).await?;
        self.create_config(conn, tenant).await?;

        if tenant == self.registry.platform_tenant() {
            self.create_superadmin(conn, tenant).await?;
        }

        Ok(true)
    }

    async fn admin_exists(&self, conn: &mut PoolConnection<Postgres>) -> Result<bool, SeedingError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_user WHERE username = $1")
            .bind("admin")
            .fetch_one(&mut **conn)
            .await?;
        Ok(count > 0)
    }

    async fn create_users(&self, conn: &mut PoolConnection<Postgres>) -> Result<(), SeedingError> {
        for user in &SEED_USERS {
            let hash = bcrypt::hash(user.password, bcrypt::DEFAULT_COST)?;
            sqlx::query(
                "INSERT INTO app_user (username, password_hash, role, is_active)
                 VALUES ($1, $2, $3, TRUE)
                 ON CONFLICT (username) DO NOTHING",
            )
            .bind(user.username)
            .bind(&hash)
            .bind(user.role)
            .execute(&mut **conn)
            .await?;
        }
        Ok(())
    }

    async fn create_products(
        &self,
        conn: &mut PoolConnection<Postgres>,
    ) -> Result<(), SeedingError> {
        for product in &SEED_PRODUCTS {
            let price = Decimal::from_str(product.price)
                .map_err(|e| SeedingError::Data(format!("price for {}: {e}", product.sku)))?;
            sqlx::query(
                "INSERT INTO product
                     (sku, title, description, category, price, stock_level, low_stock_threshold)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (sku) DO NOTHING",
            )
            .bind(product.sku)
            .bind(product.title)
            .bind(product.description)
            .bind(product.category)
            .bind(price)
            .bind(product.stock_level)
            .bind(product.low_stock_threshold)
            .execute(&mut **conn)
            .await?;
        }
        Ok(())
    }

    async fn create_config(
        &self,
        conn: &mut PoolConnection<Postgres>,
        tenant: &stockify_tenant::TenantId,
    ) -> Result<(), SeedingError> {
        let company_name = derived_company_name(tenant.schema_name());
        for entry in &SEED_CONFIG {
            let value = match entry.value {
                Some(v) => v,
                None => company_name.as_str(),
            };
            sqlx::query(
                "INSERT INTO tenant_config (config_key, config_value, config_type, description)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (config_key) DO NOTHING",
            )
            .bind(entry.key)
            .bind(value)
            .bind(entry.config_type)
            .bind(entry.description)
            .execute(&mut **conn)
            .await?;
        }
        Ok(())
    }

    /// The platform tenant carries one global account with an explicit
    /// cross-tenant access list spanning the whole registry.
    async fn create_superadmin(
        &self,
        conn: &mut PoolConnection<Postgres>,
        tenant: &stockify_tenant::TenantId,
    ) -> Result<(), SeedingError> {
        let accessible: Vec<&str> = self
            .registry
            .tenants()
            .iter()
            .map(|t| t.as_str())
            .collect();
        let hash = bcrypt::hash("superadmin123", bcrypt::DEFAULT_COST)?;

        sqlx::query(
            "INSERT INTO app_user
                 (username, password_hash, role, is_active,
                  can_manage_all_tenants, is_global_user, accessible_tenants, primary_tenant)
             VALUES ($1, $2, $3, TRUE, TRUE, TRUE, $4, $5)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind("superadmin")
        .bind(&hash)
        .bind(UserRole::SuperAdmin)
        .bind(accessible.join(","))
        .bind(tenant.as_str())
        .execute(&mut **conn)
        .await?;

        tracing::warn!(
            tenant = %tenant,
            "Seeded superadmin with default credentials; change the password after first login"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockify_database::{
        embedded_migrations, Database, DatabaseConfig, SchemaMigrationRunner,
    };

    async fn runner() -> (SeedRunner, Database, TenantRegistry) {
        let db = Database::new(DatabaseConfig::from_env())
            .await
            .expect("Failed to connect to database");
        let registry = TenantRegistry::from_env().unwrap();
        SchemaMigrationRunner::new(db.pool().clone(), embedded_migrations())
            .run(&registry)
            .await
            .expect("migrations failed");
        let provider =
            SchemaConnectionProvider::new(db.pool().clone(), registry.default_tenant().clone());
        (
            SeedRunner::new(provider, registry.clone()),
            db,
            registry,
        )
    }

    async fn row_counts(db: &Database, schema: &str) -> (i64, i64) {
        let users: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{schema}\".app_user"))
                .fetch_one(db.pool())
                .await
                .unwrap();
        let products: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{schema}\".product"))
                .fetch_one(db.pool())
                .await
                .unwrap();
        (users, products)
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn second_run_creates_no_duplicates() {
        let (runner, db, registry) = runner().await;

        runner.run().await;
        let before = row_counts(&db, registry.default_tenant().as_str()).await;

        let report = runner.run().await;
        assert_eq!(report.seeded, 0);
        assert_eq!(report.failed, 0);

        let after = row_counts(&db, registry.default_tenant().as_str()).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn platform_tenant_gets_superadmin() {
        let (runner, db, registry) = runner().await;
        runner.run().await;

        let accessible: Option<String> = sqlx::query_scalar(&format!(
            "SELECT accessible_tenants FROM \"{}\".app_user WHERE username = 'superadmin'",
            registry.platform_tenant().as_str()
        ))
        .fetch_optional(db.pool())
        .await
        .unwrap();

        let accessible = accessible.expect("superadmin missing");
        for tenant in registry.tenants() {
            assert!(accessible.contains(tenant.as_str()));
        }
    }
}
