pub mod connection;
pub mod error;
pub mod migrate;
pub mod provider;
pub mod validator;

pub use connection::{Database, DatabaseConfig};
pub use error::{DatabaseError, Result};
pub use migrate::{embedded_migrations, Migration, MigrationReport, SchemaMigrationRunner};
pub use provider::SchemaConnectionProvider;
pub use validator::TenantExistenceValidator;
