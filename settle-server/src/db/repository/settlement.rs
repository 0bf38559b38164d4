//! Settlement Repository
//!
//! One settlement record per order, keyed `settlement:{order_id}`.
//! Writes are idempotent upserts; recalculation overwrites rather than
//! duplicates. Records are never deleted.

use super::{BaseRepository, RepoError, RepoResult};
use shared::settlement::{Settlement, SettlementStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "settlement";

#[derive(Clone)]
pub struct SettlementRepository {
    base: BaseRepository,
}

impl SettlementRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Idempotent upsert keyed by order id
    pub async fn upsert(&self, settlement: &Settlement) -> RepoResult<()> {
        let _: Option<Settlement> = self
            .base
            .db()
            .upsert((TABLE, settlement.order_id.clone()))
            .content(settlement.clone())
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }

    pub async fn find_by_order(&self, order_id: &str) -> RepoResult<Option<Settlement>> {
        let settlement: Option<Settlement> = self
            .base
            .db()
            .select((TABLE, order_id))
            .await
            .map_err(RepoError::from)?;
        Ok(settlement)
    }

    pub async fn get(&self, order_id: &str) -> RepoResult<Settlement> {
        self.find_by_order(order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("settlement for order {}", order_id)))
    }

    pub async fn list_by_status(&self, status: SettlementStatus) -> RepoResult<Vec<Settlement>> {
        let status_str = match status {
            SettlementStatus::Pending => "PENDING",
            SettlementStatus::Completed => "COMPLETED",
            SettlementStatus::Cancelled => "CANCELLED",
        };
        let settlements: Vec<Settlement> = self
            .base
            .db()
            .query("SELECT * FROM settlement WHERE settlement_status = $status ORDER BY created_at ASC")
            .bind(("status", status_str))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(settlements)
    }
}
