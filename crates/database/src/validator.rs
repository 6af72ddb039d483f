use crate::error::Result;
use sqlx::PgPool;
use stockify_models::config::keys;
use stockify_tenant::TenantId;

/// Tables every well-formed tenant schema must contain. A pre-flight check
/// distinct from migration state.
const REQUIRED_TABLES: [&str; 4] = ["app_user", "product", "stock_notification", "tenant_config"];

/// Confirms that a claimed tenant identifier maps to a real, well-formed
/// schema. All lookups go through the system catalog or the tenant's own
/// `tenant_config` table; nothing here mutates state.
#[derive(Clone)]
pub struct TenantExistenceValidator {
    pool: PgPool,
    default_tenant: TenantId,
}

impl TenantExistenceValidator {
    pub fn new(pool: PgPool, default_tenant: TenantId) -> Self {
        Self {
            pool,
            default_tenant,
        }
    }

    /// Whether a schema named `normalize(id)` exists.
    pub async fn exists(&self, id: &TenantId) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = $1",
        )
        .bind(id.schema_name())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Whether the tenant's status row says ACTIVE. The default tenant is
    /// always active; a missing status row means inactive.
    pub async fn is_active(&self, id: &TenantId) -> Result<bool> {
        if *id == self.default_tenant {
            return Ok(true);
        }
        let status: Option<String> = sqlx::query_scalar(&format!(
            "SELECT config_value FROM \"{}\".tenant_config WHERE config_key = $1",
            id.schema_name()
        ))
        .bind(keys::TENANT_STATUS)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status.as_deref() == Some("ACTIVE"))
    }

    /// Human-readable tenant name, falling back to the raw identifier when
    /// the configuration row is missing or unreadable.
    pub async fn display_name(&self, id: &TenantId) -> String {
        let result: std::result::Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar(&format!(
                "SELECT config_value FROM \"{}\".tenant_config WHERE config_key = $1",
                id.schema_name()
            ))
            .bind(keys::COMPANY_NAME)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(name)) => name,
            Ok(None) => id.to_string(),
            Err(e) => {
                tracing::debug!(tenant = %id, error = %e, "Could not read display name");
                id.to_string()
            }
        }
    }

    /// Whether all required tables are present in the tenant's schema.
    pub async fn schema_is_well_formed(&self, id: &TenantId) -> Result<bool> {
        let present: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables
             WHERE table_schema = $1 AND table_name = ANY($2)",
        )
        .bind(id.schema_name())
        .bind(&REQUIRED_TABLES[..])
        .fetch_one(&self.pool)
        .await?;
        Ok(present as usize == REQUIRED_TABLES.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Database, DatabaseConfig};
    use crate::migrate::{embedded_migrations, SchemaMigrationRunner};
    use stockify_tenant::TenantRegistry;

    async fn validator() -> TenantExistenceValidator {
        let db = Database::new(DatabaseConfig::from_env())
            .await
            .expect("Failed to connect to database");
        let registry = TenantRegistry::from_env().unwrap();
        SchemaMigrationRunner::new(db.pool().clone(), embedded_migrations())
            .run(&registry)
            .await
            .expect("migrations failed");
        TenantExistenceValidator::new(db.pool().clone(), registry.default_tenant().clone())
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn registered_tenants_exist_and_unregistered_do_not() {
        let validator = validator().await;
        let registry = TenantRegistry::from_env().unwrap();
        for tenant in registry.tenants() {
            assert!(validator.exists(tenant).await.unwrap(), "{tenant} missing");
        }
        let ghost = TenantId::new("ghost_co").unwrap();
        assert!(!validator.exists(&ghost).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn default_tenant_is_always_active() {
        let validator = validator().await;
        let public = TenantId::new("public").unwrap();
        assert!(validator.is_active(&public).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn migrated_schema_is_well_formed() {
        let validator = validator().await;
        let acme = TenantId::new("acme_corp").unwrap();
        assert!(validator.schema_is_well_formed(&acme).await.unwrap());
    }
}
