//! Settlement node for the QR ordering platform
//!
//! # Architecture overview
//!
//! This crate owns the money path of the platform: splitting each order
//! among its beneficiaries, recording the split as durable settlements
//! and wallet transactions, and running the withdrawal workflow.
//!
//! # Module structure
//!
//! ```text
//! settle-server/src/
//! ├── core/        # Configuration
//! ├── db/          # SurrealDB read models, config, settlements
//! ├── fees/        # Fee schedule resolution
//! ├── pricing/     # Order price quotes
//! ├── commission/  # Split resolution
//! ├── settlement/  # Settlement engine and distribution
//! ├── wallet/      # redb wallet ledger + withdrawal workflow
//! ├── reconcile/   # Periodic retry/audit worker
//! ├── money.rs     # Decimal helpers
//! └── utils/       # Logger, geo
//! ```
//!
//! HTTP transport, authentication, and notifications live in collaborator
//! services; they call into the typed APIs exposed here.

pub mod commission;
pub mod core;
pub mod db;
pub mod fees;
pub mod money;
pub mod pricing;
pub mod reconcile;
pub mod settlement;
pub mod utils;
pub mod wallet;

// Re-export public types
pub use self::core::Config;
pub use db::DbService;
pub use fees::{FeeResolver, FeeSchedule};
pub use reconcile::{ReconcileReport, ReconcileWorker};
pub use settlement::{DistributionOutcome, SettlementEngine, SettlementError};
pub use wallet::{WalletLedger, WalletStorage, WithdrawalWorkflow};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
