use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to switch connection to schema '{schema}': {source}")]
    SchemaSwitch {
        schema: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error("Migration of schema '{schema}' failed: {reason}")]
    Migration { schema: String, reason: String },

    #[error(
        "Checksum mismatch for migration V{version} in schema '{schema}': \
         ledger has {recorded}, script has {actual}"
    )]
    ChecksumMismatch {
        schema: String,
        version: i64,
        recorded: String,
        actual: String,
    },

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}
