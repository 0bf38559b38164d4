//! Repository Module
//!
//! CRUD access to SurrealDB tables. Record ids follow the `table:id`
//! convention throughout; natural keys (order id, entity id) are the
//! record keys so lookups never need a secondary index.

pub mod delivery_partner;
pub mod fee_settings;
pub mod hotel;
pub mod order;
pub mod restaurant;
pub mod settlement;

// Re-exports
pub use delivery_partner::DeliveryPartnerRepository;
pub use fee_settings::FeeSettingsRepository;
pub use hotel::HotelRepository;
pub use order::OrderRepository;
pub use restaurant::RestaurantRepository;
pub use settlement::SettlementRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<shared::models::FeeValidationError> for RepoError {
    fn from(err: shared::models::FeeValidationError) -> Self {
        RepoError::Validation(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
