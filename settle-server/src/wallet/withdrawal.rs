//! Withdrawal workflow
//!
//! Two-phase reservation over the ledger. A request immediately moves the
//! aggregates (hold), so the beneficiary sees their committed amount at
//! once; the linked transaction stays `Pending` until an operator decides.
//! Approval commits the hold (transaction `Completed`, aggregates already
//! correct); rejection releases it symmetrically and cancels the
//! transaction.

use super::error::{WalletError, WalletResult};
use super::ledger::{apply_effect, reverse_effect};
use super::storage::WalletStorage;
use crate::money::{MONEY_TOLERANCE, to_decimal, validate_amount};
use shared::wallet::{
    PaymentMethod, TransactionStatus, TransactionType, WalletOwner, WalletTransaction,
    WithdrawalRequest, WithdrawalStatus,
};
use validator::Validate;

/// Withdrawal request input
#[derive(Debug, Clone, Validate)]
pub struct WithdrawalInput {
    #[validate(range(min = 0.01, message = "amount must be at least 0.01"))]
    pub amount: f64,
    pub payment_method: PaymentMethod,
}

fn validate_method(method: &PaymentMethod) -> WalletResult<()> {
    match method {
        PaymentMethod::BankTransfer {
            account_number,
            ifsc,
            holder_name,
        } => {
            if account_number.trim().is_empty()
                || ifsc.trim().is_empty()
                || holder_name.trim().is_empty()
            {
                return Err(WalletError::InvalidRequest(
                    "bank transfer details must be complete".to_string(),
                ));
            }
        }
        PaymentMethod::Upi { vpa } => {
            if !vpa.contains('@') {
                return Err(WalletError::InvalidRequest(format!(
                    "invalid UPI address: {}",
                    vpa
                )));
            }
        }
    }
    Ok(())
}

/// Withdrawal workflow service
#[derive(Clone)]
pub struct WithdrawalWorkflow {
    storage: WalletStorage,
}

impl WithdrawalWorkflow {
    pub fn new(storage: WalletStorage) -> Self {
        Self { storage }
    }

    /// File a withdrawal request and hold the amount.
    ///
    /// Fails with `InsufficientBalance` when the amount exceeds
    /// `total_earned - total_withdrawn`; the wallet is left untouched.
    pub fn request_withdrawal(
        &self,
        owner: &WalletOwner,
        input: WithdrawalInput,
    ) -> WalletResult<WithdrawalRequest> {
        input
            .validate()
            .map_err(|e| WalletError::InvalidRequest(e.to_string()))?;
        validate_amount(input.amount, "amount")?;
        validate_method(&input.payment_method)?;

        let txn = self.storage.begin_write()?;
        let mut wallet = self
            .storage
            .get_wallet_txn(&txn, &owner.key())?
            .ok_or_else(|| WalletError::WalletNotFound(owner.key()))?;

        let amount = to_decimal(input.amount);
        let withdrawable = to_decimal(wallet.withdrawable());
        if amount > withdrawable + MONEY_TOLERANCE {
            return Err(WalletError::InsufficientBalance {
                requested: input.amount,
                available: wallet.withdrawable(),
            });
        }

        let now = shared::util::now_millis();
        let transaction = WalletTransaction {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            amount: input.amount,
            tx_type: TransactionType::Withdrawal,
            status: TransactionStatus::Pending,
            order_id: None,
            description: format!("Withdrawal request for {:.2}", input.amount),
            created_at: now,
            processed_at: None,
        };
        let request = WithdrawalRequest {
            request_id: uuid::Uuid::new_v4().to_string(),
            amount: input.amount,
            status: WithdrawalStatus::Pending,
            payment_method: input.payment_method,
            transaction_id: transaction.transaction_id.clone(),
            requested_at: now,
            processed_at: None,
            processed_by: None,
            reject_reason: None,
        };

        // Hold: the debit lands now, while the transaction stays Pending
        apply_effect(&mut wallet, TransactionType::Withdrawal, amount);
        wallet.transactions.push(transaction);
        wallet.withdrawal_requests.push(request.clone());
        wallet.last_transaction_at = Some(now);
        wallet.updated_at = now;

        self.storage.store_wallet(&txn, &wallet)?;
        txn.commit().map_err(super::storage::WalletStorageError::from)?;

        tracing::info!(
            owner = %owner,
            request_id = %request.request_id,
            amount = request.amount,
            "Withdrawal requested"
        );
        Ok(request)
    }

    /// Approve a pending request: the hold becomes final and the linked
    /// transaction completes. Aggregates do not move again.
    pub fn approve(
        &self,
        owner: &WalletOwner,
        request_id: &str,
        operator: &str,
    ) -> WalletResult<WithdrawalRequest> {
        self.transition(owner, request_id, operator, |wallet, request| {
            if request.status != WithdrawalStatus::Pending {
                return Err(WalletError::InvalidState {
                    expected: WithdrawalStatus::Pending,
                    found: request.status,
                });
            }
            request.status = WithdrawalStatus::Approved;

            let tx_id = request.transaction_id.clone();
            let now = request.processed_at.unwrap_or_else(shared::util::now_millis);
            let tx = wallet
                .find_transaction_mut(&tx_id)
                .ok_or(WalletError::TransactionNotFound(tx_id))?;
            tx.status = TransactionStatus::Completed;
            tx.processed_at = Some(now);
            Ok(())
        })
    }

    /// Reject a pending request: release the held amount and cancel the
    /// linked transaction. Counters floor at zero.
    pub fn reject(
        &self,
        owner: &WalletOwner,
        request_id: &str,
        operator: &str,
        reason: &str,
    ) -> WalletResult<WithdrawalRequest> {
        let reason = reason.to_string();
        self.transition(owner, request_id, operator, move |wallet, request| {
            if request.status != WithdrawalStatus::Pending {
                return Err(WalletError::InvalidState {
                    expected: WithdrawalStatus::Pending,
                    found: request.status,
                });
            }
            request.status = WithdrawalStatus::Rejected;
            request.reject_reason = Some(reason.clone());

            let amount = to_decimal(request.amount);
            let tx_id = request.transaction_id.clone();
            let now = request.processed_at.unwrap_or_else(shared::util::now_millis);

            reverse_effect(wallet, TransactionType::Withdrawal, amount);
            let tx = wallet
                .find_transaction_mut(&tx_id)
                .ok_or(WalletError::TransactionNotFound(tx_id))?;
            tx.status = TransactionStatus::Cancelled;
            tx.processed_at = Some(now);
            Ok(())
        })
    }

    /// Mark an approved request as paid out by the external channel
    pub fn mark_processed(
        &self,
        owner: &WalletOwner,
        request_id: &str,
        operator: &str,
    ) -> WalletResult<WithdrawalRequest> {
        self.transition(owner, request_id, operator, |_, request| {
            if request.status != WithdrawalStatus::Approved {
                return Err(WalletError::InvalidState {
                    expected: WithdrawalStatus::Approved,
                    found: request.status,
                });
            }
            request.status = WithdrawalStatus::Processed;
            Ok(())
        })
    }

    pub fn list_requests(&self, owner: &WalletOwner) -> WalletResult<Vec<WithdrawalRequest>> {
        let Some(wallet) = self.storage.get_wallet(&owner.key())? else {
            return Ok(Vec::new());
        };
        Ok(wallet.withdrawal_requests)
    }

    /// Shared load-mutate-store skeleton for request transitions. The
    /// mutation closure gets the request pre-stamped with processing
    /// metadata and may touch the rest of the wallet through its first
    /// argument.
    fn transition<F>(
        &self,
        owner: &WalletOwner,
        request_id: &str,
        operator: &str,
        mutate: F,
    ) -> WalletResult<WithdrawalRequest>
    where
        F: FnOnce(&mut shared::wallet::WalletSnapshot, &mut WithdrawalRequest) -> WalletResult<()>,
    {
        let txn = self.storage.begin_write()?;
        let mut wallet = self
            .storage
            .get_wallet_txn(&txn, &owner.key())?
            .ok_or_else(|| WalletError::WalletNotFound(owner.key()))?;

        let index = wallet
            .withdrawal_requests
            .iter()
            .position(|r| r.request_id == request_id)
            .ok_or_else(|| WalletError::RequestNotFound(request_id.to_string()))?;

        let now = shared::util::now_millis();
        let mut request = wallet.withdrawal_requests[index].clone();
        request.processed_at = Some(now);
        request.processed_by = Some(operator.to_string());

        mutate(&mut wallet, &mut request)?;

        wallet.withdrawal_requests[index] = request.clone();
        wallet.updated_at = now;

        self.storage.store_wallet(&txn, &wallet)?;
        txn.commit().map_err(super::storage::WalletStorageError::from)?;

        tracing::info!(
            owner = %owner,
            request_id = %request.request_id,
            status = ?request.status,
            operator = %operator,
            "Withdrawal request updated"
        );
        Ok(request)
    }
}
