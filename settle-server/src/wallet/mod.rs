//! Wallet Ledger Module
//!
//! One wallet per beneficiary, holding an append-only transaction list
//! plus three derived aggregate counters. All mutations go through
//! [`WalletLedger`] (credits, status transitions) or
//! [`WithdrawalWorkflow`] (payout requests) so the aggregates stay
//! consistent with the transaction log; nothing else writes them.
//!
//! # Concurrency
//!
//! Storage is redb with a single writer. Every mutation is one
//! read-modify-write inside one write transaction, so two concurrent
//! credits on the same wallet serialize instead of losing an update.

pub mod error;
pub mod ledger;
pub mod storage;
pub mod withdrawal;

pub use error::{WalletError, WalletResult};
pub use ledger::{CreditInput, WalletLedger};
pub use storage::WalletStorage;
pub use withdrawal::{WithdrawalInput, WithdrawalWorkflow};
