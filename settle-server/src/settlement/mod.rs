//! Settlement Engine Module
//!
//! Orchestrates the money flow for one order: builds the settlement
//! snapshot, reacts to order status changes, and distributes commission
//! credits to beneficiary wallets exactly once.

pub mod engine;
pub mod error;

pub use engine::{DistributionOutcome, SettlementEngine};
pub use error::{SettlementError, SettlementResult};
