use stockify_database::DatabaseConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    /// Opt-in re-baselining of drifted migration checksums. Off by default.
    pub migrate_repair: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database: DatabaseConfig::from_env(),
            migrate_repair: std::env::var("STOCKIFY_MIGRATE_REPAIR")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
