use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One (key, value) row from a tenant's `tenant_config` table. The type
/// column is advisory ("STRING", "INTEGER", "BOOLEAN"); values are stored
/// as text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantConfigEntry {
    pub config_key: String,
    pub config_value: String,
    pub config_type: String,
    pub description: Option<String>,
}

/// Well-known configuration keys written by the seeder and read by the
/// existence validator.
pub mod keys {
    pub const COMPANY_NAME: &str = "company_name";
    pub const CURRENCY: &str = "currency";
    pub const LOCALE: &str = "locale";
    pub const LOW_STOCK_THRESHOLD: &str = "low_stock_threshold";
    pub const NOTIFICATIONS_ENABLED: &str = "notifications_enabled";
    pub const TENANT_STATUS: &str = "tenant_status";
}
