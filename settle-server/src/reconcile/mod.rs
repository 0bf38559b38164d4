//! Reconciliation worker
//!
//! Periodic safety net for the at-least-once gaps in distribution:
//!
//! - Delivered hotel-QR orders that never got flagged as distributed
//!   (crash between credits and flag-set, or a failed credit) are
//!   retried. Wallet-level probes make the retry safe for beneficiaries
//!   that were already credited.
//! - Wallet aggregates are audited against the
//!   `balance == earned - withdrawn` invariant. Discrepancies are logged
//!   for manual review, never silently corrected.

use crate::db::repository::OrderRepository;
use crate::money::money_eq;
use crate::settlement::SettlementEngine;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

/// Max orders retried per pass
const RETRY_BATCH: usize = 100;

/// Outcome of one reconciliation pass
#[derive(Debug, Default, Clone)]
pub struct ReconcileReport {
    pub retried: usize,
    pub distributed: usize,
    pub failed: usize,
    pub wallets_checked: usize,
    pub discrepancies: usize,
}

/// Periodic reconciliation worker
pub struct ReconcileWorker {
    engine: Arc<SettlementEngine>,
    orders: OrderRepository,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ReconcileWorker {
    pub fn new(
        db: Surreal<Db>,
        engine: Arc<SettlementEngine>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            orders: OrderRepository::new(db),
            interval,
            shutdown,
        }
    }

    /// Main loop: one pass per interval until shutdown
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Reconcile worker started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    let report = self.run_once().await;
                    if report.failed > 0 || report.discrepancies > 0 {
                        tracing::warn!(?report, "Reconciliation pass found problems");
                    } else {
                        tracing::debug!(?report, "Reconciliation pass clean");
                    }
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reconcile worker received shutdown signal");
                    return;
                }
            }
        }
    }

    /// One full pass: retry stuck distributions, then audit wallets
    pub async fn run_once(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.retry_undistributed(&mut report).await;
        self.audit_wallets(&mut report);
        report
    }

    async fn retry_undistributed(&self, report: &mut ReconcileReport) {
        let orders = match self.orders.find_undistributed_hotel_qr(RETRY_BATCH).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan for undistributed orders");
                return;
            }
        };

        for order in orders {
            report.retried += 1;
            match self.engine.distribute_commissions(&order.order_id).await {
                Ok(outcome) if !outcome.already_distributed => {
                    report.distributed += 1;
                    tracing::info!(order_id = %order.order_id, "Recovered stuck distribution");
                }
                Ok(_) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        order_id = %order.order_id,
                        error = %e,
                        "Distribution retry failed"
                    );
                }
            }
        }
    }

    fn audit_wallets(&self, report: &mut ReconcileReport) {
        let wallets = match self.engine.ledger().storage().get_all_wallets() {
            Ok(wallets) => wallets,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load wallets for audit");
                return;
            }
        };

        for wallet in wallets {
            report.wallets_checked += 1;

            if wallet.total_balance < 0.0
                || wallet.total_earned < 0.0
                || wallet.total_withdrawn < 0.0
            {
                report.discrepancies += 1;
                tracing::error!(
                    owner = %wallet.owner,
                    balance = wallet.total_balance,
                    earned = wallet.total_earned,
                    withdrawn = wallet.total_withdrawn,
                    "Negative wallet aggregate"
                );
                continue;
            }

            // Only terminal histories must satisfy the equality; a pending
            // non-withdrawal transaction legitimately defers its effect
            if wallet.has_pending_transactions() {
                continue;
            }
            let expected = wallet.total_earned - wallet.total_withdrawn;
            if !money_eq(wallet.total_balance, expected) {
                report.discrepancies += 1;
                tracing::error!(
                    owner = %wallet.owner,
                    balance = wallet.total_balance,
                    expected,
                    "Wallet aggregates out of balance, manual review required"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Hotel, Restaurant};
    use crate::db::repository::{HotelRepository, RestaurantRepository};
    use crate::wallet::{WalletLedger, WalletStorage};
    use shared::order::{Order, OrderItem, OrderPricing, OrderStatus, OrderType};
    use shared::wallet::{OwnerKind, WalletOwner, WalletSnapshot};
    use surrealdb::engine::local::RocksDb;

    struct Rig {
        worker: ReconcileWorker,
        ledger: WalletLedger,
        orders: OrderRepository,
        _tmp: tempfile::TempDir,
    }

    async fn rig() -> Rig {
        let tmp = tempfile::tempdir().unwrap();
        let db: Surreal<Db> = Surreal::new::<RocksDb>(tmp.path()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();

        RestaurantRepository::new(db.clone())
            .upsert(&Restaurant {
                restaurant_id: "r-1".to_string(),
                name: "Spice Route".to_string(),
                commission_pct: None,
                free_delivery_threshold: None,
                location: None,
                is_active: true,
            })
            .await
            .unwrap();
        HotelRepository::new(db.clone())
            .upsert(&Hotel {
                hotel_id: "h-1".to_string(),
                name: "Grand Palms".to_string(),
                hotel_commission_pct: Some(15.0),
                admin_commission_pct: Some(10.0),
                is_active: true,
            })
            .await
            .unwrap();

        let ledger = WalletLedger::new(WalletStorage::open_in_memory().unwrap());
        let engine = Arc::new(SettlementEngine::new(db.clone(), ledger.clone()));
        let worker = ReconcileWorker::new(
            db.clone(),
            engine,
            Duration::from_secs(300),
            CancellationToken::new(),
        );
        Rig {
            worker,
            ledger,
            orders: OrderRepository::new(db),
            _tmp: tmp,
        }
    }

    fn delivered_qr_order(order_id: &str) -> Order {
        let now = shared::util::now_millis();
        Order {
            order_id: order_id.to_string(),
            order_type: OrderType::HotelQr,
            status: OrderStatus::Delivered,
            items: vec![OrderItem {
                name: "Thali".to_string(),
                price: 1000.0,
                quantity: 1,
            }],
            pricing: OrderPricing {
                subtotal: 1000.0,
                discount: 0.0,
                delivery_fee: 0.0,
                platform_fee: 5.0,
                tax: 50.0,
                total: 1055.0,
            },
            restaurant_id: "r-1".to_string(),
            hotel_id: Some("h-1".to_string()),
            delivery_partner_id: None,
            delivery_distance_km: None,
            commission_breakdown: None,
            commission_percentages: None,
            commission_distributed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_recovers_stuck_distribution() {
        let rig = rig().await;
        rig.orders.upsert(&delivered_qr_order("o-1")).await.unwrap();

        let report = rig.worker.run_once().await;
        assert_eq!(report.retried, 1);
        assert_eq!(report.distributed, 1);
        assert_eq!(report.failed, 0);

        let order = rig.orders.get("o-1").await.unwrap();
        assert!(order.commission_distributed);

        let hotel = rig
            .ledger
            .get(&WalletOwner::new(OwnerKind::Hotel, "h-1"))
            .unwrap()
            .unwrap();
        assert_eq!(hotel.total_balance, 150.0);

        // Second pass finds nothing to do
        let report = rig.worker.run_once().await;
        assert_eq!(report.retried, 0);
    }

    #[tokio::test]
    async fn test_flags_out_of_balance_wallet() {
        let rig = rig().await;

        // Write a wallet whose aggregates disagree with each other,
        // bypassing the ledger
        let mut wallet = WalletSnapshot::new(WalletOwner::new(OwnerKind::Restaurant, "r-9"));
        wallet.total_balance = 500.0;
        wallet.total_earned = 100.0;
        let storage = rig.ledger.storage();
        let txn = storage.begin_write().unwrap();
        storage.store_wallet(&txn, &wallet).unwrap();
        txn.commit().unwrap();

        let report = rig.worker.run_once().await;
        assert_eq!(report.wallets_checked, 1);
        assert_eq!(report.discrepancies, 1);
    }

    #[tokio::test]
    async fn test_clean_pass_reports_nothing() {
        let rig = rig().await;
        let report = rig.worker.run_once().await;
        assert_eq!(report.retried, 0);
        assert_eq!(report.wallets_checked, 0);
        assert_eq!(report.discrepancies, 0);
    }
}
