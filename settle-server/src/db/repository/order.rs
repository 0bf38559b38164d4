//! Order Repository
//!
//! The order table is written by the order-management service. This node
//! reads orders and writes back exactly one thing: the commission result
//! (breakdown + percentages + `commission_distributed`), after every
//! beneficiary credit has succeeded.

use super::{BaseRepository, RepoError, RepoResult};
use shared::order::{CommissionBreakdown, CommissionPercentages, Order};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self
            .base
            .db()
            .select((TABLE, order_id))
            .await
            .map_err(RepoError::from)?;
        Ok(order)
    }

    /// Fetch an order or fail with `NotFound`
    pub async fn get(&self, order_id: &str) -> RepoResult<Order> {
        self.find_by_id(order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("order {}", order_id)))
    }

    /// Persist the distribution result onto the order. Called only after
    /// all beneficiary credits have succeeded.
    pub async fn set_commission_result(
        &self,
        order_id: &str,
        breakdown: &CommissionBreakdown,
        percentages: &CommissionPercentages,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"
                UPDATE type::thing('orders', $order_id) SET
                    commission_breakdown = $breakdown,
                    commission_percentages = $percentages,
                    commission_distributed = true,
                    updated_at = $now
                "#,
            )
            .bind(("order_id", order_id.to_string()))
            .bind(("breakdown", breakdown.clone()))
            .bind(("percentages", *percentages))
            .bind(("now", shared::util::now_millis()))
            .await
            .map_err(RepoError::from)?
            .check()
            .map_err(RepoError::from)?;
        Ok(())
    }

    /// Delivered hotel-QR orders whose commissions have not been
    /// distributed yet. Used by the reconciliation pass.
    pub async fn find_undistributed_hotel_qr(&self, limit: usize) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(format!(
                r#"
                SELECT * FROM orders
                WHERE order_type = 'HOTEL_QR'
                  AND status = 'DELIVERED'
                  AND commission_distributed = false
                ORDER BY created_at ASC
                LIMIT {}
                "#,
                limit
            ))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(orders)
    }

    /// Upsert a full order record. The ordering service does this through
    /// its own stack; here it exists for seeding and tests.
    pub async fn upsert(&self, order: &Order) -> RepoResult<()> {
        let _: Option<Order> = self
            .base
            .db()
            .upsert((TABLE, order.order_id.clone()))
            .content(order.clone())
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }
}
