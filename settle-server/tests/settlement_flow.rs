//! End-to-end settlement flow
//!
//! Drives a hotel-QR order from calculation through delivery, commission
//! distribution, and a withdrawal round trip, checking the money
//! invariants at each step.

use settle_server::db::models::{Hotel, Restaurant};
use settle_server::db::repository::{HotelRepository, OrderRepository, RestaurantRepository};
use settle_server::wallet::{WalletStorage, WithdrawalInput, WithdrawalWorkflow};
use settle_server::{SettlementEngine, WalletLedger};
use shared::order::{Order, OrderItem, OrderPricing, OrderStatus, OrderType, StatusChange};
use shared::settlement::{EscrowStatus, SettlementStatus};
use shared::wallet::{OwnerKind, PaymentMethod, TransactionType, WalletOwner, WithdrawalStatus};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

struct Stack {
    engine: Arc<SettlementEngine>,
    ledger: WalletLedger,
    workflow: WithdrawalWorkflow,
    orders: OrderRepository,
    _tmp: tempfile::TempDir,
}

async fn stack() -> Stack {
    let tmp = tempfile::tempdir().unwrap();
    let db: Surreal<Db> = Surreal::new::<RocksDb>(tmp.path()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let wallet_storage = WalletStorage::open_in_memory().unwrap();
    let ledger = WalletLedger::new(wallet_storage.clone());
    let workflow = WithdrawalWorkflow::new(wallet_storage);
    let engine = Arc::new(SettlementEngine::new(db.clone(), ledger.clone()));

    RestaurantRepository::new(db.clone())
        .upsert(&Restaurant {
            restaurant_id: "r-1".to_string(),
            name: "Spice Route".to_string(),
            commission_pct: Some(30.0),
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

    Stack {
        engine,
        ledger,
        workflow,
        orders: OrderRepository::new(db),
        _tmp: tmp,
    }
}

fn order(order_id: &str, order_type: OrderType, subtotal: f64) -> Order {
    let now = shared::util::now_millis();
    Order {
        order_id: order_id.to_string(),
        order_type,
        status: OrderStatus::Confirmed,
        items: vec![OrderItem {
            name: "Thali".to_string(),
            price: subtotal,
            quantity: 1,
        }],
        pricing: OrderPricing {
            subtotal,
            discount: 0.0,
            delivery_fee: 0.0,
            platform_fee: 5.0,
            tax: 50.0,
            total: subtotal + 55.0,
        },
        restaurant_id: "r-1".to_string(),
        hotel_id: (order_type == OrderType::HotelQr).then(|| "h-1".to_string()),
        delivery_partner_id: None,
        delivery_distance_km: None,
        commission_breakdown: None,
        commission_percentages: None,
        commission_distributed: false,
        created_at: now,
        updated_at: now,
    }
}

fn commission_count(stack: &Stack, owner: &WalletOwner, order_id: &str) -> usize {
    stack
        .ledger
        .get(owner)
        .unwrap()
        .map(|w| {
            w.transactions
                .iter()
                .filter(|t| {
                    t.tx_type == TransactionType::Commission
                        && t.order_id.as_deref() == Some(order_id)
                })
                .count()
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn hotel_qr_order_full_lifecycle() {
    let stack = stack().await;
    stack
        .orders
        .upsert(&order("o-1", OrderType::HotelQr, 1000.0))
        .await
        .unwrap();

    // Calculation: 15% hotel + 10% admin leave 750 for the restaurant
    let settlement = stack.engine.calculate_settlement("o-1").await.unwrap();
    let hotel_earning = settlement.hotel_earning.as_ref().unwrap();
    assert_eq!(hotel_earning.amount, 150.0);
    assert_eq!(settlement.admin_earning.commission, 100.0);
    assert_eq!(settlement.restaurant_earning.net_earning, 750.0);
    assert_eq!(
        hotel_earning.amount
            + settlement.admin_earning.commission
            + settlement.restaurant_earning.net_earning,
        settlement.user_payment.subtotal
    );

    // Delivery releases escrow and credits the hotel share
    let mut delivered = stack.orders.get("o-1").await.unwrap();
    delivered.status = OrderStatus::Delivered;
    stack.orders.upsert(&delivered).await.unwrap();
    stack
        .engine
        .handle_status_change(&StatusChange {
            order_id: "o-1".to_string(),
            previous: OrderStatus::Confirmed,
            next: OrderStatus::Delivered,
        })
        .await
        .unwrap();

    let settlement = stack.engine.settlements().get("o-1").await.unwrap();
    assert_eq!(settlement.escrow_status, EscrowStatus::Released);
    assert_eq!(settlement.settlement_status, SettlementStatus::Completed);

    let hotel = WalletOwner::new(OwnerKind::Hotel, "h-1");
    let hotel_wallet = stack.ledger.get(&hotel).unwrap().unwrap();
    assert_eq!(hotel_wallet.total_balance, 150.0);
    assert_eq!(hotel_wallet.total_earned, 150.0);

    // Distribution completes the other two beneficiaries and stays
    // idempotent across repeats
    let outcome = stack.engine.distribute_commissions("o-1").await.unwrap();
    assert!(!outcome.already_distributed);
    let outcome = stack.engine.distribute_commissions("o-1").await.unwrap();
    assert!(outcome.already_distributed);

    let admin = WalletOwner::new(OwnerKind::Admin, "platform");
    let restaurant = WalletOwner::new(OwnerKind::Restaurant, "r-1");
    for (owner, expected) in [(&hotel, 150.0), (&admin, 100.0), (&restaurant, 750.0)] {
        assert_eq!(commission_count(&stack, owner, "o-1"), 1);
        let wallet = stack.ledger.get(owner).unwrap().unwrap();
        assert_eq!(wallet.total_balance, expected);
        assert_eq!(
            wallet.total_balance,
            wallet.total_earned - wallet.total_withdrawn
        );
    }

    // Withdrawal round trip on the restaurant wallet
    let input = WithdrawalInput {
        amount: 100.0,
        payment_method: PaymentMethod::Upi {
            vpa: "spiceroute@upi".to_string(),
        },
    };
    let request = stack
        .workflow
        .request_withdrawal(&restaurant, input.clone())
        .unwrap();

    let wallet = stack.ledger.get(&restaurant).unwrap().unwrap();
    assert_eq!(wallet.total_balance, 650.0);
    assert_eq!(wallet.total_withdrawn, 100.0);

    // Operator rejects; everything restores
    stack
        .workflow
        .reject(&restaurant, &request.request_id, "ops-1", "KYC incomplete")
        .unwrap();
    let wallet = stack.ledger.get(&restaurant).unwrap().unwrap();
    assert_eq!(wallet.total_balance, 750.0);
    assert_eq!(wallet.total_withdrawn, 0.0);

    // Second attempt goes through approval to payout
    let request = stack.workflow.request_withdrawal(&restaurant, input).unwrap();
    stack
        .workflow
        .approve(&restaurant, &request.request_id, "ops-1")
        .unwrap();
    let processed = stack
        .workflow
        .mark_processed(&restaurant, &request.request_id, "ops-1")
        .unwrap();
    assert_eq!(processed.status, WithdrawalStatus::Processed);

    let wallet = stack.ledger.get(&restaurant).unwrap().unwrap();
    assert_eq!(wallet.total_balance, 650.0);
    assert_eq!(wallet.total_withdrawn, 100.0);
    assert!(!wallet.has_pending_transactions());
    assert_eq!(
        wallet.total_balance,
        wallet.total_earned - wallet.total_withdrawn
    );
}

#[tokio::test]
async fn direct_order_split_uses_restaurant_override() {
    let stack = stack().await;
    stack
        .orders
        .upsert(&order("o-2", OrderType::Direct, 500.0))
        .await
        .unwrap();

    let settlement = stack.engine.calculate_settlement("o-2").await.unwrap();
    assert!(settlement.hotel_earning.is_none());
    assert_eq!(settlement.admin_earning.commission, 150.0);
    assert_eq!(settlement.restaurant_earning.net_earning, 350.0);
    assert_eq!(
        settlement.admin_earning.commission + settlement.restaurant_earning.net_earning,
        settlement.user_payment.subtotal
    );
}

#[tokio::test]
async fn cancelled_order_never_credits() {
    let stack = stack().await;
    stack
        .orders
        .upsert(&order("o-3", OrderType::HotelQr, 1000.0))
        .await
        .unwrap();

    // Breakdown computed ahead of time, but never applied
    stack.engine.calculate_settlement("o-3").await.unwrap();

    let mut cancelled = stack.orders.get("o-3").await.unwrap();
    cancelled.status = OrderStatus::Cancelled;
    stack.orders.upsert(&cancelled).await.unwrap();
    stack
        .engine
        .handle_status_change(&StatusChange {
            order_id: "o-3".to_string(),
            previous: OrderStatus::Confirmed,
            next: OrderStatus::Cancelled,
        })
        .await
        .unwrap();

    let settlement = stack.engine.settlements().get("o-3").await.unwrap();
    assert_eq!(settlement.escrow_status, EscrowStatus::Refunded);
    assert_eq!(settlement.settlement_status, SettlementStatus::Cancelled);
    assert_eq!(stack.ledger.storage().wallet_count().unwrap(), 0);
}
