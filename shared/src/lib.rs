//! Shared types for the settlement platform
//!
//! Common types used across the settlement node and its collaborator
//! services: the order read model, wallet/ledger types, settlement
//! snapshots, fee configuration, and utility helpers.

pub mod models;
pub mod order;
pub mod settlement;
pub mod util;
pub mod wallet;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{Order, OrderStatus, OrderType, StatusChange};
pub use settlement::{EscrowStatus, Settlement, SettlementStatus};
pub use wallet::{OwnerKind, TransactionStatus, TransactionType, WalletOwner, WalletSnapshot};
