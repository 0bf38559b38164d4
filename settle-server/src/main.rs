//! Settlement node entrypoint
//!
//! Opens both databases, wires the engine, and runs the reconciliation
//! worker until interrupted. Order status changes and distribution
//! triggers arrive through the collaborator services that embed this
//! crate; the binary's own job is the periodic safety net.

use settle_server::reconcile::ReconcileWorker;
use settle_server::{Config, DbService, SettlementEngine, WalletLedger, WalletStorage};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    settle_server::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Settlement node starting"
    );

    std::fs::create_dir_all(&config.work_dir)?;

    let db_service = DbService::new(&config.surreal_path).await?;
    let wallet_storage = WalletStorage::open(&config.wallet_db_path)?;
    let ledger = WalletLedger::new(wallet_storage);
    let engine = Arc::new(SettlementEngine::new(db_service.db(), ledger));

    let shutdown = CancellationToken::new();
    let worker = ReconcileWorker::new(
        db_service.db(),
        engine.clone(),
        Duration::from_secs(config.reconcile_interval_secs),
        shutdown.clone(),
    );

    // Run one pass immediately so a restart repairs stuck state right away
    let report = worker.run_once().await;
    tracing::info!(?report, "Startup reconciliation pass done");

    let handle = tokio::spawn(worker.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
    let _ = handle.await;

    tracing::info!("Settlement node stopped");
    Ok(())
}
