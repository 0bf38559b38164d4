//! Settlement engine
//!
//! # Calculation flow
//!
//! ```text
//! calculate_settlement(order_id)
//!     ├─ 1. Load order + beneficiary records
//!     ├─ 2. Snapshot the active fee schedule
//!     ├─ 3. Resolve percentages (order → entity override → defaults)
//!     ├─ 4. Split the subtotal, compute delivery payout and admin total
//!     ├─ 5. Carry over earning statuses from any existing settlement
//!     └─ 6. Upsert keyed by order (recompute overwrites, never duplicates)
//! ```
//!
//! # Distribution
//!
//! `distribute_commissions` credits hotel, admin, and restaurant wallets
//! for a hotel-QR order. The order-level `commission_distributed` flag is
//! a cache of "fully done"; each wallet credit independently probes the
//! ledger for an existing commission transaction for this order, so a
//! retry after partial failure only credits the beneficiaries that were
//! missed. The flag and the three credits are not one atomic unit; a
//! crash between them leaves the flag unset and the retry path safe.

use super::error::{SettlementError, SettlementResult};
use crate::commission::{
    ResolvedPercentages, resolve_direct_percentages, resolve_hotel_qr_percentages, split_direct,
    split_hotel_qr,
};
use crate::db::repository::{
    DeliveryPartnerRepository, HotelRepository, OrderRepository, RestaurantRepository,
    SettlementRepository,
};
use crate::fees::{FeeResolver, FeeSchedule};
use crate::money::{round2, to_decimal, to_f64};
use crate::wallet::{CreditInput, WalletLedger};
use rust_decimal::Decimal;
use shared::order::{CommissionBreakdown, Order, OrderType, StatusChange};
use shared::settlement::{
    AdminEarning, CalculationSnapshot, DeliveryPartnerEarning, EarningStatus, EscrowStatus,
    HotelEarning, RestaurantEarning, Settlement, SettlementStatus, UserPayment,
};
use shared::wallet::{OwnerKind, WalletOwner};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// The single platform wallet owner id
const ADMIN_WALLET_ID: &str = "platform";

/// Result of a distribution call
#[derive(Debug, Clone)]
pub struct DistributionOutcome {
    pub order_id: String,
    pub breakdown: CommissionBreakdown,
    /// True when the order was already flagged and this call was a no-op
    pub already_distributed: bool,
}

pub struct SettlementEngine {
    orders: OrderRepository,
    restaurants: RestaurantRepository,
    hotels: HotelRepository,
    partners: DeliveryPartnerRepository,
    settlements: SettlementRepository,
    fees: FeeResolver,
    ledger: WalletLedger,
}

impl SettlementEngine {
    pub fn new(db: Surreal<Db>, ledger: WalletLedger) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            restaurants: RestaurantRepository::new(db.clone()),
            hotels: HotelRepository::new(db.clone()),
            partners: DeliveryPartnerRepository::new(db.clone()),
            settlements: SettlementRepository::new(db.clone()),
            fees: FeeResolver::new(db),
            ledger,
        }
    }

    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }

    pub fn settlements(&self) -> &SettlementRepository {
        &self.settlements
    }

    /// Resolve percentages and split the subtotal for an order
    async fn resolve_split(
        &self,
        order: &Order,
        schedule: &FeeSchedule,
    ) -> SettlementResult<(ResolvedPercentages, CommissionBreakdown)> {
        let split = match order.order_type {
            OrderType::HotelQr => {
                let hotel = match &order.hotel_id {
                    Some(hotel_id) => self.hotels.find_by_id(hotel_id).await?,
                    None => None,
                };
                let resolved = resolve_hotel_qr_percentages(order, hotel.as_ref(), schedule);
                let split = split_hotel_qr(
                    order.pricing.subtotal,
                    resolved.hotel_pct,
                    resolved.admin_pct,
                )?;
                (resolved, split)
            }
            OrderType::Direct => {
                let restaurant = self.restaurants.find_by_id(&order.restaurant_id).await?;
                let resolved = resolve_direct_percentages(order, restaurant.as_ref(), schedule);
                let split = split_direct(order.pricing.subtotal, resolved.admin_pct)?;
                (resolved, split)
            }
        };
        Ok((split.0, split.1.as_breakdown()))
    }

    /// Compute the delivery partner payout, when one is assigned
    async fn delivery_earning(
        &self,
        order: &Order,
        schedule: &FeeSchedule,
    ) -> SettlementResult<Option<DeliveryPartnerEarning>> {
        let (Some(partner_id), Some(distance_km)) =
            (&order.delivery_partner_id, order.delivery_distance_km)
        else {
            return Ok(None);
        };

        let partner = self.partners.find_by_id(partner_id).await?;
        let per_km_rate = schedule.per_km_rate(partner.and_then(|p| p.per_km_rate));

        let base = round2(to_decimal(distance_km) * to_decimal(per_km_rate));
        let surge = round2(base * (to_decimal(schedule.surge_multiplier()) - Decimal::ONE));
        let total = base + surge;

        Ok(Some(DeliveryPartnerEarning {
            base_payout: to_f64(base),
            distance_km,
            per_km_rate,
            surge_amount: to_f64(surge),
            total: to_f64(total),
            status: EarningStatus::Pending,
        }))
    }

    /// Build (or rebuild) the settlement snapshot for an order.
    ///
    /// Idempotent: keyed by order id, recomputation overwrites the money
    /// figures but carries over crediting state and creation time from an
    /// existing record.
    pub async fn calculate_settlement(&self, order_id: &str) -> SettlementResult<Settlement> {
        let order = self.orders.get(order_id).await?;
        let schedule = self.fees.active_schedule().await?;
        let existing = self.settlements.find_by_order(order_id).await?;

        let (resolved, breakdown) = self.resolve_split(&order, &schedule).await?;

        let user_payment = UserPayment {
            subtotal: order.pricing.subtotal,
            discount: order.pricing.discount,
            delivery_fee: order.pricing.delivery_fee,
            platform_fee: order.pricing.platform_fee,
            tax: order.pricing.tax,
            total: order.pricing.total,
        };

        let commission =
            to_f64(to_decimal(order.pricing.subtotal) - to_decimal(breakdown.restaurant));
        let restaurant_earning = RestaurantEarning {
            food_price: order.pricing.subtotal,
            commission,
            net_earning: breakdown.restaurant,
            status: existing
                .as_ref()
                .map(|s| s.restaurant_earning.status)
                .unwrap_or(EarningStatus::Pending),
        };

        let hotel_earning = (order.order_type == OrderType::HotelQr).then(|| HotelEarning {
            amount: breakdown.hotel,
            commission_pct: resolved.hotel_pct,
            status: existing
                .as_ref()
                .and_then(|s| s.hotel_earning.as_ref())
                .map(|h| h.status)
                .unwrap_or(EarningStatus::Pending),
        });

        let mut delivery_partner_earning = self.delivery_earning(&order, &schedule).await?;
        if let (Some(earning), Some(previous)) = (
            delivery_partner_earning.as_mut(),
            existing
                .as_ref()
                .and_then(|s| s.delivery_partner_earning.as_ref()),
        ) {
            earning.status = previous.status;
        }

        let partner_payout = delivery_partner_earning
            .as_ref()
            .map(|e| to_decimal(e.total))
            .unwrap_or(Decimal::ZERO);
        let delivery_margin =
            (to_decimal(order.pricing.delivery_fee) - partner_payout).max(Decimal::ZERO);
        let admin_total = to_decimal(breakdown.admin)
            + to_decimal(order.pricing.platform_fee)
            + delivery_margin;
        let admin_earning = AdminEarning {
            commission: breakdown.admin,
            platform_fee: order.pricing.platform_fee,
            delivery_margin: to_f64(delivery_margin),
            total: to_f64(admin_total),
        };

        let now = shared::util::now_millis();
        let settlement = Settlement {
            order_id: order.order_id.clone(),
            user_payment,
            restaurant_earning,
            hotel_earning,
            delivery_partner_earning,
            admin_earning,
            escrow_status: existing
                .as_ref()
                .map(|s| s.escrow_status)
                .unwrap_or(EscrowStatus::Pending),
            settlement_status: existing
                .as_ref()
                .map(|s| s.settlement_status)
                .unwrap_or(SettlementStatus::Pending),
            calculation_snapshot: CalculationSnapshot {
                fee_settings_version: schedule.version(),
                commission_source: resolved.source,
                hotel_pct: resolved.hotel_pct,
                admin_pct: resolved.admin_pct,
                calculated_at: now,
            },
            created_at: existing.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.settlements.upsert(&settlement).await?;
        tracing::debug!(order_id = %order_id, "Settlement calculated");
        Ok(settlement)
    }

    /// React to an order status transition.
    ///
    /// `Delivered` releases escrow, completes the settlement, and credits
    /// the hotel share at most once. `Cancelled` refunds escrow and
    /// cancels the settlement without any crediting. Non-terminal
    /// transitions just refresh the snapshot.
    pub async fn handle_status_change(&self, change: &StatusChange) -> SettlementResult<()> {
        if !change.previous.can_transition(change.next) {
            tracing::warn!(
                order_id = %change.order_id,
                previous = ?change.previous,
                next = ?change.next,
                "Unexpected order status transition"
            );
        }

        let mut settlement = self.calculate_settlement(&change.order_id).await?;

        match change.next {
            shared::order::OrderStatus::Delivered => {
                settlement.escrow_status = EscrowStatus::Released;
                settlement.settlement_status = SettlementStatus::Completed;

                self.credit_hotel_share(&mut settlement).await?;

                settlement.updated_at = shared::util::now_millis();
                self.settlements.upsert(&settlement).await?;
                tracing::info!(order_id = %change.order_id, "Settlement completed, escrow released");
            }
            shared::order::OrderStatus::Cancelled => {
                settlement.escrow_status = EscrowStatus::Refunded;
                settlement.settlement_status = SettlementStatus::Cancelled;
                settlement.restaurant_earning.status = EarningStatus::Cancelled;
                if let Some(hotel) = settlement.hotel_earning.as_mut() {
                    hotel.status = EarningStatus::Cancelled;
                }
                if let Some(partner) = settlement.delivery_partner_earning.as_mut() {
                    partner.status = EarningStatus::Cancelled;
                }

                settlement.updated_at = shared::util::now_millis();
                self.settlements.upsert(&settlement).await?;
                tracing::info!(order_id = %change.order_id, "Settlement cancelled, escrow refunded");
            }
            _ => {
                // Snapshot already refreshed above
            }
        }

        Ok(())
    }

    /// Credit the hotel share once, guarded by the earning status and by
    /// the wallet-level commission probe. Distinct from, and layered
    /// under, the order-level flag used by full distribution.
    async fn credit_hotel_share(&self, settlement: &mut Settlement) -> SettlementResult<()> {
        let order = self.orders.get(&settlement.order_id).await?;
        let Some(hotel_earning) = settlement.hotel_earning.as_mut() else {
            return Ok(());
        };
        if hotel_earning.status == EarningStatus::Completed {
            return Ok(());
        }
        let Some(hotel_id) = &order.hotel_id else {
            tracing::warn!(order_id = %settlement.order_id, "Hotel earning without hotel reference");
            return Ok(());
        };

        let owner = WalletOwner::new(OwnerKind::Hotel, hotel_id.clone());
        if hotel_earning.amount > 0.0
            && !self
                .ledger
                .has_commission_for_order(&owner, &settlement.order_id)?
        {
            self.ledger.add_transaction(
                &owner,
                CreditInput::commission(
                    hotel_earning.amount,
                    &settlement.order_id,
                    format!("Hotel share for order {}", settlement.order_id),
                ),
            )?;
            tracing::info!(
                order_id = %settlement.order_id,
                hotel = %owner,
                amount = hotel_earning.amount,
                "Hotel share credited"
            );
        }
        hotel_earning.status = EarningStatus::Completed;
        Ok(())
    }

    /// Distribute the three-way hotel-QR split to beneficiary wallets.
    ///
    /// Re-invocation on an already flagged order is a no-op success that
    /// returns the cached shares. On partial failure the flag stays
    /// unset; already-applied credits are detected through the ledger on
    /// retry, so only missed beneficiaries are credited then.
    pub async fn distribute_commissions(
        &self,
        order_id: &str,
    ) -> SettlementResult<DistributionOutcome> {
        let order = self.orders.get(order_id).await?;

        if order.order_type != OrderType::HotelQr {
            return Err(SettlementError::NotApplicable(format!(
                "order {} is not a hotel-QR order",
                order_id
            )));
        }

        if order.commission_distributed {
            let breakdown = match order.commission_breakdown.clone() {
                Some(breakdown) => breakdown,
                None => {
                    // Flag set by an older build that did not persist the
                    // shares; recompute without crediting
                    let schedule = self.fees.active_schedule().await?;
                    self.resolve_split(&order, &schedule).await?.1
                }
            };
            tracing::debug!(order_id = %order_id, "Distribution already done, returning cached shares");
            return Ok(DistributionOutcome {
                order_id: order_id.to_string(),
                breakdown,
                already_distributed: true,
            });
        }

        let hotel_id = order.hotel_id.clone().ok_or_else(|| {
            SettlementError::NotApplicable(format!(
                "hotel-QR order {} has no hotel reference",
                order_id
            ))
        })?;

        // Make sure the audit snapshot exists before any money moves
        if self.settlements.find_by_order(order_id).await?.is_none() {
            self.calculate_settlement(order_id).await?;
        }

        let schedule = self.fees.active_schedule().await?;
        let (resolved, breakdown) = self.resolve_split(&order, &schedule).await?;

        let credits = [
            (
                WalletOwner::new(OwnerKind::Hotel, hotel_id),
                breakdown.hotel,
                "Hotel share",
            ),
            (
                WalletOwner::new(OwnerKind::Admin, ADMIN_WALLET_ID),
                breakdown.admin,
                "Platform share",
            ),
            (
                WalletOwner::new(OwnerKind::Restaurant, order.restaurant_id.clone()),
                breakdown.restaurant,
                "Restaurant share",
            ),
        ];

        let mut credited: Vec<String> = Vec::new();
        for (owner, amount, label) in credits {
            if amount <= 0.0 {
                tracing::debug!(owner = %owner, order_id = %order_id, "Zero share, skipping credit");
                continue;
            }
            if self.ledger.has_commission_for_order(&owner, order_id)? {
                tracing::info!(
                    owner = %owner,
                    order_id = %order_id,
                    "Commission already credited, skipping"
                );
                credited.push(owner.key());
                continue;
            }
            match self.ledger.add_transaction(
                &owner,
                CreditInput::commission(
                    amount,
                    order_id,
                    format!("{} for order {}", label, order_id),
                ),
            ) {
                Ok(_) => credited.push(owner.key()),
                Err(e) => {
                    tracing::error!(
                        order_id = %order_id,
                        owner = %owner,
                        credited = ?credited,
                        error = %e,
                        "Distribution failed partway, order left eligible for retry"
                    );
                    return Err(SettlementError::PartialFailure {
                        order_id: order_id.to_string(),
                        credited,
                        failed: owner.key(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // Every credit succeeded; now cache the result on the order
        self.orders
            .set_commission_result(order_id, &breakdown, &resolved.as_stored())
            .await?;

        // Mirror crediting into the settlement earning statuses
        if let Some(mut settlement) = self.settlements.find_by_order(order_id).await? {
            settlement.restaurant_earning.status = EarningStatus::Completed;
            if let Some(hotel) = settlement.hotel_earning.as_mut() {
                hotel.status = EarningStatus::Completed;
            }
            settlement.updated_at = shared::util::now_millis();
            self.settlements.upsert(&settlement).await?;
        }

        tracing::info!(
            order_id = %order_id,
            hotel = breakdown.hotel,
            admin = breakdown.admin,
            restaurant = breakdown.restaurant,
            "Commissions distributed"
        );

        Ok(DistributionOutcome {
            order_id: order_id.to_string(),
            breakdown,
            already_distributed: false,
        })
    }
}
