//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) holding the order read model,
//! beneficiary records, fee configuration, and settlement snapshots.
//! The wallet ledger deliberately does not live here; see `wallet::storage`.

pub mod models;
pub mod repository;

use repository::{RepoError, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "settle";
const DATABASE: &str = "settle";

/// Database service owning the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at the given directory
    pub async fn new(path: &str) -> RepoResult<Self> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
            .await
            .map_err(RepoError::from)?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(RepoError::from)?;

        tracing::info!(path = %path, "Database connection established (SurrealDB/RocksDB)");
        Ok(Self { db })
    }

    pub fn db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
