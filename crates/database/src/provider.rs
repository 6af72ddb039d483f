use crate::error::{DatabaseError, Result};
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use stockify_tenant::TenantId;

/// Checks connections out of the shared pool and routes them to a tenant
/// schema by rewriting `search_path` on the checked-out handle.
///
/// Schema is a property of the physical connection, not of the pool slot,
/// and the pool retains connections across operations. The contract is
/// therefore strict: every [`get_connection`](Self::get_connection) must be
/// paired with [`release_connection`](Self::release_connection), which resets
/// the schema to the default before the handle re-enters the pool. A
/// connection whose schema state is unknown (failed switch, failed reset) is
/// detached from the pool and closed instead of being reused.
#[derive(Clone)]
pub struct SchemaConnectionProvider {
    pool: PgPool,
    default_schema: TenantId,
}

impl SchemaConnectionProvider {
    pub fn new(pool: PgPool, default_schema: TenantId) -> Self {
        Self {
            pool,
            default_schema,
        }
    }

    pub fn default_schema(&self) -> &TenantId {
        &self.default_schema
    }

    /// A pooled connection with no schema guarantee. Suitable only for
    /// catalog queries that name schemas explicitly.
    pub async fn get_any_connection(&self) -> Result<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }

    /// A pooled connection switched to the tenant's schema. `None` maps to
    /// the default tenant. On switch failure the connection is discarded,
    /// never handed back with an unknown schema.
    pub async fn get_connection(
        &self,
        tenant: Option<&TenantId>,
    ) -> Result<PoolConnection<Postgres>> {
        let tenant = tenant.unwrap_or(&self.default_schema);
        let mut conn = self.pool.acquire().await?;

        if let Err(source) = set_search_path(&mut conn, tenant.schema_name()).await {
            tracing::error!(schema = %tenant, error = %source, "Failed to switch connection schema");
            // Unknown schema state: take the connection out of the pool.
            drop(conn.detach());
            return Err(DatabaseError::SchemaSwitch {
                schema: tenant.to_string(),
                source,
            });
        }

        tracing::debug!(schema = %tenant, "Connection switched to tenant schema");
        Ok(conn)
    }

    /// Resets the connection to the default schema and returns it to the
    /// pool. Skipping this leaks the tenant's schema into the next,
    /// unrelated checkout.
    pub async fn release_connection(&self, mut conn: PoolConnection<Postgres>) -> Result<()> {
        match set_search_path(&mut conn, self.default_schema.schema_name()).await {
            Ok(()) => {
                // Dropping the handle returns it to the pool, now neutral.
                drop(conn);
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    schema = %self.default_schema,
                    error = %source,
                    "Failed to reset connection schema; discarding connection"
                );
                drop(conn.detach());
                Err(DatabaseError::SchemaSwitch {
                    schema: self.default_schema.to_string(),
                    source,
                })
            }
        }
    }

    /// The schema a given connection currently reports. Exposed for
    /// integration tests and diagnostics.
    pub async fn current_schema(conn: &mut PoolConnection<Postgres>) -> Result<String> {
        let schema: String = sqlx::query_scalar("SELECT current_schema()")
            .fetch_one(&mut **conn)
            .await?;
        Ok(schema)
    }
}

async fn set_search_path(
    conn: &mut PoolConnection<Postgres>,
    schema: &str,
) -> std::result::Result<(), sqlx::Error> {
    // schema comes from a TenantId, whose constructor enforces [a-z0-9_].
    sqlx::query(&format!("SET search_path TO \"{}\"", schema))
        .execute(&mut **conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Database, DatabaseConfig};

    async fn provider() -> SchemaConnectionProvider {
        let db = Database::new(DatabaseConfig::from_env())
            .await
            .expect("Failed to connect to database");
        SchemaConnectionProvider::new(db.pool().clone(), TenantId::new("public").unwrap())
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn switch_and_reset_round_trip() {
        let provider = provider().await;
        let acme = TenantId::new("acme_corp").unwrap();

        let mut conn = provider.get_connection(Some(&acme)).await.unwrap();
        let schema = SchemaConnectionProvider::current_schema(&mut conn)
            .await
            .unwrap();
        assert_eq!(schema, "acme_corp");

        provider.release_connection(conn).await.unwrap();

        // The same pool slot must come back neutral.
        let mut conn = provider.get_any_connection().await.unwrap();
        let schema = SchemaConnectionProvider::current_schema(&mut conn)
            .await
            .unwrap();
        assert_eq!(schema, "public");
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn none_maps_to_default_schema() {
        let provider = provider().await;
        let mut conn = provider.get_connection(None).await.unwrap();
        let schema = SchemaConnectionProvider::current_schema(&mut conn)
            .await
            .unwrap();
        assert_eq!(schema, "public");
        provider.release_connection(conn).await.unwrap();
    }
}
