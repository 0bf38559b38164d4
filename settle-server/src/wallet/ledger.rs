//! Wallet ledger operations
//!
//! Aggregate effects per transaction type:
//!
//! | Type | balance | earned | withdrawn |
//! |------|---------|--------|-----------|
//! | commission, bonus, refund | + | + | |
//! | cash_collection | | + | |
//! | withdrawal | − | | + |
//! | deduction | − | | |
//!
//! Effects apply when a transaction reaches `Completed` and reverse when
//! a completed transaction is compensated to `Failed`/`Cancelled`.
//! Reversals clamp aggregates at zero so out-of-order compensation cannot
//! drive a counter negative.

use super::error::{WalletError, WalletResult};
use super::storage::WalletStorage;
use crate::money::{MONEY_TOLERANCE, to_decimal, to_f64, validate_amount};
use rust_decimal::Decimal;
use shared::wallet::{
    TransactionStatus, TransactionType, WalletOwner, WalletSnapshot, WalletTransaction,
};

/// Input for a new ledger transaction
#[derive(Debug, Clone)]
pub struct CreditInput {
    pub amount: f64,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub order_id: Option<String>,
    pub description: String,
}

impl CreditInput {
    /// A completed commission credit tagged with its order
    pub fn commission(amount: f64, order_id: &str, description: impl Into<String>) -> Self {
        Self {
            amount,
            tx_type: TransactionType::Commission,
            status: TransactionStatus::Completed,
            order_id: Some(order_id.to_string()),
            description: description.into(),
        }
    }
}

/// Whether this type debits the platform-held balance
fn is_debit(tx_type: TransactionType) -> bool {
    matches!(
        tx_type,
        TransactionType::Withdrawal | TransactionType::Deduction
    )
}

/// Apply the aggregate effect of a completed transaction
pub(crate) fn apply_effect(wallet: &mut WalletSnapshot, tx_type: TransactionType, amount: Decimal) {
    let balance = to_decimal(wallet.total_balance);
    let earned = to_decimal(wallet.total_earned);
    let withdrawn = to_decimal(wallet.total_withdrawn);

    match tx_type {
        TransactionType::Commission | TransactionType::Bonus | TransactionType::Refund => {
            wallet.total_balance = to_f64(balance + amount);
            wallet.total_earned = to_f64(earned + amount);
        }
        TransactionType::CashCollection => {
            // Cash stays with the beneficiary; it counts as earned but is
            // never held in the platform balance
            wallet.total_earned = to_f64(earned + amount);
        }
        TransactionType::Withdrawal => {
            wallet.total_balance = to_f64(balance - amount);
            wallet.total_withdrawn = to_f64(withdrawn + amount);
        }
        TransactionType::Deduction => {
            wallet.total_balance = to_f64(balance - amount);
        }
    }
}

/// Reverse the aggregate effect of a previously applied transaction,
/// clamping every counter at zero.
pub(crate) fn reverse_effect(
    wallet: &mut WalletSnapshot,
    tx_type: TransactionType,
    amount: Decimal,
) {
    let balance = to_decimal(wallet.total_balance);
    let earned = to_decimal(wallet.total_earned);
    let withdrawn = to_decimal(wallet.total_withdrawn);

    match tx_type {
        TransactionType::Commission | TransactionType::Bonus | TransactionType::Refund => {
            wallet.total_balance = to_f64((balance - amount).max(Decimal::ZERO));
            wallet.total_earned = to_f64((earned - amount).max(Decimal::ZERO));
        }
        TransactionType::CashCollection => {
            wallet.total_earned = to_f64((earned - amount).max(Decimal::ZERO));
        }
        TransactionType::Withdrawal => {
            wallet.total_balance = to_f64(balance + amount);
            wallet.total_withdrawn = to_f64((withdrawn - amount).max(Decimal::ZERO));
        }
        TransactionType::Deduction => {
            wallet.total_balance = to_f64(balance + amount);
        }
    }
}

/// Ledger service over wallet storage
#[derive(Clone)]
pub struct WalletLedger {
    storage: WalletStorage,
}

impl WalletLedger {
    pub fn new(storage: WalletStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &WalletStorage {
        &self.storage
    }

    /// Return the wallet for an owner, creating a zero-balance one if it
    /// does not exist yet.
    pub fn find_or_create(&self, owner: &WalletOwner) -> WalletResult<WalletSnapshot> {
        let txn = self.storage.begin_write()?;
        let wallet = match self.storage.get_wallet_txn(&txn, &owner.key())? {
            Some(wallet) => wallet,
            None => {
                let wallet = WalletSnapshot::new(owner.clone());
                self.storage.store_wallet(&txn, &wallet)?;
                tracing::info!(owner = %owner, "Wallet created");
                wallet
            }
        };
        txn.commit().map_err(super::storage::WalletStorageError::from)?;
        Ok(wallet)
    }

    /// Read a wallet without creating it
    pub fn get(&self, owner: &WalletOwner) -> WalletResult<Option<WalletSnapshot>> {
        Ok(self.storage.get_wallet(&owner.key())?)
    }

    /// Append a transaction, atomically updating aggregates when it is
    /// already `Completed`. Debit types must be covered by the current
    /// balance.
    pub fn add_transaction(
        &self,
        owner: &WalletOwner,
        input: CreditInput,
    ) -> WalletResult<WalletTransaction> {
        validate_amount(input.amount, "amount")?;

        let txn = self.storage.begin_write()?;
        let mut wallet = match self.storage.get_wallet_txn(&txn, &owner.key())? {
            Some(wallet) => wallet,
            None => WalletSnapshot::new(owner.clone()),
        };

        let amount = to_decimal(input.amount);
        if input.status == TransactionStatus::Completed && is_debit(input.tx_type) {
            let balance = to_decimal(wallet.total_balance);
            if amount > balance + MONEY_TOLERANCE {
                return Err(WalletError::InsufficientBalance {
                    requested: input.amount,
                    available: wallet.total_balance,
                });
            }
        }

        let now = shared::util::now_millis();
        let transaction = WalletTransaction {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            amount: input.amount,
            tx_type: input.tx_type,
            status: input.status,
            order_id: input.order_id,
            description: input.description,
            created_at: now,
            processed_at: (input.status == TransactionStatus::Completed).then_some(now),
        };

        if input.status == TransactionStatus::Completed {
            apply_effect(&mut wallet, input.tx_type, amount);
        }

        wallet.transactions.push(transaction.clone());
        wallet.last_transaction_at = Some(now);
        wallet.updated_at = now;

        self.storage.store_wallet(&txn, &wallet)?;
        txn.commit().map_err(super::storage::WalletStorageError::from)?;

        tracing::debug!(
            owner = %owner,
            transaction_id = %transaction.transaction_id,
            tx_type = ?transaction.tx_type,
            amount = transaction.amount,
            "Transaction appended"
        );
        Ok(transaction)
    }

    /// Transition a transaction's status and mirror the aggregate effect.
    ///
    /// `Pending → Completed` applies the effect; `Completed → Failed` or
    /// `Completed → Cancelled` reverses it (clamped). `Pending → Failed`
    /// and `Pending → Cancelled` only close the transaction.
    pub fn update_transaction_status(
        &self,
        owner: &WalletOwner,
        transaction_id: &str,
        new_status: TransactionStatus,
    ) -> WalletResult<WalletTransaction> {
        let txn = self.storage.begin_write()?;
        let mut wallet = self
            .storage
            .get_wallet_txn(&txn, &owner.key())?
            .ok_or_else(|| WalletError::WalletNotFound(owner.key()))?;

        let (current, tx_type, amount) = {
            let tx = wallet
                .find_transaction(transaction_id)
                .ok_or_else(|| WalletError::TransactionNotFound(transaction_id.to_string()))?;
            (tx.status, tx.tx_type, to_decimal(tx.amount))
        };

        let allowed = matches!(
            (current, new_status),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
                | (TransactionStatus::Pending, TransactionStatus::Cancelled)
                | (TransactionStatus::Completed, TransactionStatus::Failed)
                | (TransactionStatus::Completed, TransactionStatus::Cancelled)
        );
        if !allowed {
            return Err(WalletError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        match (current, new_status) {
            (TransactionStatus::Pending, TransactionStatus::Completed) => {
                if is_debit(tx_type) {
                    let balance = to_decimal(wallet.total_balance);
                    if amount > balance + MONEY_TOLERANCE {
                        return Err(WalletError::InsufficientBalance {
                            requested: to_f64(amount),
                            available: wallet.total_balance,
                        });
                    }
                }
                apply_effect(&mut wallet, tx_type, amount);
            }
            (TransactionStatus::Completed, _) => {
                reverse_effect(&mut wallet, tx_type, amount);
            }
            _ => {}
        }

        let now = shared::util::now_millis();
        let updated = {
            let tx = wallet
                .find_transaction_mut(transaction_id)
                .ok_or_else(|| WalletError::TransactionNotFound(transaction_id.to_string()))?;
            tx.status = new_status;
            tx.processed_at = Some(now);
            tx.clone()
        };
        wallet.updated_at = now;

        self.storage.store_wallet(&txn, &wallet)?;
        txn.commit().map_err(super::storage::WalletStorageError::from)?;

        Ok(updated)
    }

    /// Whether a live commission transaction for this order already exists
    /// on the wallet. This is the retry guard for distribution: credits
    /// recompute their own "already done" from the log rather than trust
    /// the order flag alone.
    pub fn has_commission_for_order(
        &self,
        owner: &WalletOwner,
        order_id: &str,
    ) -> WalletResult<bool> {
        let Some(wallet) = self.storage.get_wallet(&owner.key())? else {
            return Ok(false);
        };
        Ok(wallet.transactions.iter().any(|tx| {
            tx.tx_type == TransactionType::Commission
                && tx.order_id.as_deref() == Some(order_id)
                && matches!(
                    tx.status,
                    TransactionStatus::Pending | TransactionStatus::Completed
                )
        }))
    }

    /// Most recent transactions, newest first
    pub fn recent_transactions(
        &self,
        owner: &WalletOwner,
        limit: usize,
    ) -> WalletResult<Vec<WalletTransaction>> {
        let Some(wallet) = self.storage.get_wallet(&owner.key())? else {
            return Ok(Vec::new());
        };
        let mut transactions = wallet.transactions;
        transactions.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        transactions.truncate(limit);
        Ok(transactions)
    }
}
