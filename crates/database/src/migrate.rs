use crate::error::{DatabaseError, Result};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use stockify_tenant::{TenantId, TenantRegistry};

/// One versioned, checksummed migration script.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.sql.as_bytes()))
    }
}

/// The ordered set shipped with this binary. Versions must be strictly
/// increasing; `SchemaMigrationRunner::new` asserts it.
pub fn embedded_migrations() -> &'static [Migration] {
    &[
        Migration {
            version: 1,
            description: "create core tables",
            sql: include_str!("../migrations/V1__create_core_tables.sql"),
        },
        Migration {
            version: 2,
            description: "create tenant config",
            sql: include_str!("../migrations/V2__create_tenant_config.sql"),
        },
        Migration {
            version: 3,
            description: "add cross tenant access",
            sql: include_str!("../migrations/V3__add_cross_tenant_access.sql"),
        },
    ]
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub schemas: usize,
    pub applied: usize,
}

/// Brings every registered tenant schema to the latest version at boot.
///
/// Each schema owns its own ledger table (`schema_history_<schema>`), so
/// histories never cross-contaminate. Schemas are migrated sequentially; the
/// first failure aborts the whole run, because the server must not start
/// serving a partially-migrated tenant set.
pub struct SchemaMigrationRunner {
    pool: PgPool,
    migrations: &'static [Migration],
    repair: bool,
}

impl SchemaMigrationRunner {
    pub fn new(pool: PgPool, migrations: &'static [Migration]) -> Self {
        assert!(
            migrations.windows(2).all(|w| w[0].version < w[1].version),
            "migration versions must be strictly increasing"
        );
        Self {
            pool,
            migrations,
            repair: false,
        }
    }

    /// Opt-in re-baselining: on checksum mismatch, rewrite the ledger entry
    /// instead of failing. Never the default.
    pub fn with_repair(mut self, repair: bool) -> Self {
        self.repair = repair;
        self
    }

    pub async fn run(&self, registry: &TenantRegistry) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();
        for tenant in registry.tenants() {
            let applied = self.migrate_schema(tenant).await?;
            report.schemas += 1;
            report.applied += applied;
        }
        tracing::info!(
            schemas = report.schemas,
            applied = report.applied,
            "Schema migrations complete"
        );
        Ok(report)
    }

    /// Creates the schema and its ledger if absent, validates checksums of
    /// already-applied versions, then applies outstanding scripts in order.
    async fn migrate_schema(&self, tenant: &TenantId) -> Result<usize> {
        let schema = tenant.schema_name();
        let ledger = ledger_table(tenant);
        tracing::info!(%schema, "Migrating schema");

        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema))
            .execute(&self.pool)
            .await
            .map_err(|e| migration_err(schema, format!("create schema: {e}")))?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS \"{schema}\".\"{ledger}\" (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                checksum TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| migration_err(schema, format!("create ledger table: {e}")))?;

        let recorded: Vec<(i64, String)> = sqlx::query_as(&format!(
            "SELECT version, checksum FROM \"{schema}\".\"{ledger}\" ORDER BY version"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| migration_err(schema, format!("read ledger: {e}")))?;

        let plan = plan_schema(schema, self.migrations, &recorded)?;

        for mismatch in &plan.mismatched {
            if !self.repair {
                return Err(DatabaseError::ChecksumMismatch {
                    schema: schema.to_string(),
                    version: mismatch.version,
                    recorded: mismatch.recorded.clone(),
                    actual: mismatch.actual.clone(),
                });
            }
            tracing::warn!(
                %schema,
                version = mismatch.version,
                "Repair enabled: re-recording ledger checksum"
            );
            sqlx::query(&format!(
                "UPDATE \"{schema}\".\"{ledger}\" SET checksum = $1 WHERE version = $2"
            ))
            .bind(&mismatch.actual)
            .bind(mismatch.version)
            .execute(&self.pool)
            .await
            .map_err(|e| migration_err(schema, format!("repair ledger: {e}")))?;
        }

        for migration in &plan.pending {
            self.apply(tenant, migration).await?;
        }

        if plan.pending.is_empty() {
            tracing::debug!(%schema, "Schema already current");
        } else {
            tracing::info!(%schema, applied = plan.pending.len(), "Schema migrated");
        }
        Ok(plan.pending.len())
    }

    /// Script and ledger insert commit atomically; `SET LOCAL search_path`
    /// confines the script to this schema for the transaction only.
    async fn apply(&self, tenant: &TenantId, migration: &Migration) -> Result<()> {
        let schema = tenant.schema_name();
        let ledger = ledger_table(tenant);
        tracing::info!(
            %schema,
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| migration_err(schema, format!("begin: {e}")))?;

        sqlx::query(&format!("SET LOCAL search_path TO \"{}\"", schema))
            .execute(&mut *tx)
            .await
            .map_err(|e| migration_err(schema, format!("set search_path: {e}")))?;

        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                migration_err(schema, format!("V{} failed: {e}", migration.version))
            })?;

        sqlx::query(&format!(
            "INSERT INTO \"{schema}\".\"{ledger}\" (version, description, checksum)
             VALUES ($1, $2, $3)"
        ))
        .bind(migration.version)
        .bind(migration.description)
        .bind(migration.checksum())
        .execute(&mut *tx)
        .await
        .map_err(|e| migration_err(schema, format!("record V{}: {e}", migration.version)))?;

        tx.commit()
            .await
            .map_err(|e| migration_err(schema, format!("commit V{}: {e}", migration.version)))?;
        Ok(())
    }
}

fn ledger_table(tenant: &TenantId) -> String {
    format!("schema_history_{}", tenant.schema_name())
}

fn migration_err(schema: &str, reason: String) -> DatabaseError {
    DatabaseError::Migration {
        schema: schema.to_string(),
        reason,
    }
}

#[derive(Debug)]
struct ChecksumDrift {
    version: i64,
    recorded: String,
    actual: String,
}

#[derive(Debug)]
struct SchemaPlan<'a> {
    pending: Vec<&'a Migration>,
    mismatched: Vec<ChecksumDrift>,
}

/// Pure planning step: given the ledger contents, decide which scripts are
/// outstanding and which applied entries drifted from their script.
fn plan_schema<'a>(
    schema: &str,
    migrations: &'a [Migration],
    recorded: &[(i64, String)],
) -> Result<SchemaPlan<'a>> {
    let mut pending = Vec::new();
    let mut mismatched = Vec::new();

    for (version, checksum) in recorded {
        match migrations.iter().find(|m| m.version == *version) {
            Some(migration) => {
                let actual = migration.checksum();
                if actual != *checksum {
                    mismatched.push(ChecksumDrift {
                        version: *version,
                        recorded: checksum.clone(),
                        actual,
                    });
                }
            }
            None => {
                return Err(migration_err(
                    schema,
                    format!("ledger records unknown version V{version}"),
                ));
            }
        }
    }

    let max_recorded = recorded.iter().map(|(v, _)| *v).max();
    for migration in migrations {
        if !recorded.iter().any(|(v, _)| *v == migration.version) {
            // A pending script below an already-applied version would run out
            // of order; the ledger cannot represent that history honestly.
            if let Some(max) = max_recorded {
                if migration.version < max {
                    return Err(migration_err(
                        schema,
                        format!(
                            "pending V{} is below already-applied V{max}; \
                             out-of-order migrations are rejected",
                            migration.version
                        ),
                    ));
                }
            }
            pending.push(migration);
        }
    }

    Ok(SchemaPlan {
        pending,
        mismatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Database, DatabaseConfig};

    const M1: Migration = Migration {
        version: 1,
        description: "one",
        sql: "CREATE TABLE IF NOT EXISTS a (id BIGINT)",
    };
    const M2: Migration = Migration {
        version: 2,
        description: "two",
        sql: "CREATE TABLE IF NOT EXISTS b (id BIGINT)",
    };

    #[test]
    fn empty_ledger_plans_everything() {
        let plan = plan_schema("acme", &[M1, M2], &[]).unwrap();
        assert_eq!(
            plan.pending.iter().map(|m| m.version).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(plan.mismatched.is_empty());
    }

    #[test]
    fn current_ledger_plans_nothing() {
        let recorded = vec![(1, M1.checksum()), (2, M2.checksum())];
        let plan = plan_schema("acme", &[M1, M2], &recorded).unwrap();
        assert!(plan.pending.is_empty());
        assert!(plan.mismatched.is_empty());
    }

    #[test]
    fn partial_ledger_plans_the_tail() {
        let recorded = vec![(1, M1.checksum())];
        let plan = plan_schema("acme", &[M1, M2], &recorded).unwrap();
        assert_eq!(
            plan.pending.iter().map(|m| m.version).collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn drifted_checksum_is_flagged() {
        let recorded = vec![(1, "deadbeef".to_string())];
        let plan = plan_schema("acme", &[M1, M2], &recorded).unwrap();
        assert_eq!(plan.mismatched.len(), 1);
        assert_eq!(plan.mismatched[0].version, 1);
        assert_eq!(plan.mismatched[0].actual, M1.checksum());
    }

    #[test]
    fn out_of_order_pending_version_is_an_error() {
        // Ledger already has V2 but the binary ships V1 as well: V1 must not
        // quietly run after V2.
        let recorded = vec![(2, M2.checksum())];
        let err = plan_schema("acme", &[M1, M2], &recorded).unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[test]
    fn unknown_ledger_version_is_an_error() {
        let recorded = vec![(9, "cafe".to_string())];
        let err = plan_schema("acme", &[M1], &recorded).unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[test]
    fn embedded_set_is_strictly_ordered() {
        let versions: Vec<i64> = embedded_migrations().iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        assert_eq!(M1.checksum(), M1.checksum());
        assert_ne!(M1.checksum(), M2.checksum());
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn second_run_applies_nothing() {
        let db = Database::new(DatabaseConfig::from_env())
            .await
            .expect("Failed to connect to database");
        let registry = TenantRegistry::from_env().unwrap();
        let runner = SchemaMigrationRunner::new(db.pool().clone(), embedded_migrations());

        runner.run(&registry).await.expect("first run failed");
        let report = runner.run(&registry).await.expect("second run failed");
        assert_eq!(report.applied, 0);
        assert_eq!(report.schemas, registry.tenants().len());
    }
}
