//! Wallet error types

use crate::money::AmountError;
use shared::wallet::{TransactionStatus, WithdrawalStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Storage error: {0}")]
    Storage(#[from] super::storage::WalletStorageError),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Withdrawal request not found: {0}")]
    RequestNotFound(String),

    #[error("Insufficient balance: requested {requested:.2}, withdrawable {available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Invalid transaction status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("Invalid request state: expected {expected:?}, found {found:?}")]
    InvalidState {
        expected: WithdrawalStatus,
        found: WithdrawalStatus,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

pub type WalletResult<T> = Result<T, WalletError>;
