//! Settlement node configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/settle | Working directory for databases and logs |
//! | SURREAL_PATH | {WORK_DIR}/surreal | SurrealDB (RocksDB) data directory |
//! | WALLET_DB_PATH | {WORK_DIR}/wallets.redb | Wallet ledger database file |
//! | LOG_LEVEL | info | Tracing filter level |
//! | LOG_DIR | (unset) | Daily-rolling log file directory |
//! | RECONCILE_INTERVAL_SECS | 300 | Reconciliation worker interval |
//! | ENVIRONMENT | development | development | staging | production |

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for databases and logs
    pub work_dir: String,
    /// SurrealDB data directory
    pub surreal_path: String,
    /// Wallet ledger database file
    pub wallet_db_path: String,
    /// Tracing level
    pub log_level: String,
    /// Optional rolling-file log directory
    pub log_dir: Option<String>,
    /// Reconciliation worker interval in seconds
    pub reconcile_interval_secs: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, using defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/settle".into());
        Self {
            surreal_path: std::env::var("SURREAL_PATH")
                .unwrap_or_else(|_| format!("{}/surreal", work_dir)),
            wallet_db_path: std::env::var("WALLET_DB_PATH")
                .unwrap_or_else(|_| format!("{}/wallets.redb", work_dir)),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            reconcile_interval_secs: std::env::var("RECONCILE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// Override paths, typically for tests
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let work_dir = work_dir.into();
        let mut config = Self::from_env();
        config.surreal_path = format!("{}/surreal", work_dir);
        config.wallet_db_path = format!("{}/wallets.redb", work_dir);
        config.work_dir = work_dir;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
