//! redb-based storage layer for wallet ledgers
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `wallets` | owner key (`kind:id`) | `WalletSnapshot` JSON | Full wallet state |
//!
//! Transactions and withdrawal requests are embedded in the snapshot;
//! they are owned by their wallet and never stored standalone.
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns, using
//! copy-on-write with an atomic pointer swap. The file stays consistent
//! across power loss, which matters for a ledger that cannot re-derive
//! balances from anywhere else.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::wallet::WalletSnapshot;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for wallets: key = owner key, value = JSON-serialized WalletSnapshot
const WALLETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

/// Storage errors
#[derive(Debug, Error)]
pub enum WalletStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, WalletStorageError>;

/// Wallet storage backed by redb
#[derive(Clone)]
pub struct WalletStorage {
    db: Arc<Database>,
}

impl WalletStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLETS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLETS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction. Blocks while another writer is active,
    /// which is what serializes concurrent mutations of the same wallet.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Get a wallet by owner key (within a write transaction)
    pub fn get_wallet_txn(
        &self,
        txn: &WriteTransaction,
        owner_key: &str,
    ) -> StorageResult<Option<WalletSnapshot>> {
        let table = txn.open_table(WALLETS_TABLE)?;
        match table.get(owner_key)? {
            Some(value) => {
                let wallet: WalletSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(wallet))
            }
            None => Ok(None),
        }
    }

    /// Store a wallet (within a write transaction)
    pub fn store_wallet(
        &self,
        txn: &WriteTransaction,
        wallet: &WalletSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(WALLETS_TABLE)?;
        let value = serde_json::to_vec(wallet)?;
        table.insert(wallet.owner.key().as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a wallet by owner key (read-only)
    pub fn get_wallet(&self, owner_key: &str) -> StorageResult<Option<WalletSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;
        match table.get(owner_key)? {
            Some(value) => {
                let wallet: WalletSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(wallet))
            }
            None => Ok(None),
        }
    }

    /// Get all wallets (reconciliation and reporting)
    pub fn get_all_wallets(&self) -> StorageResult<Vec<WalletSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;

        let mut wallets = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let wallet: WalletSnapshot = serde_json::from_slice(value.value())?;
            wallets.push(wallet);
        }
        Ok(wallets)
    }

    /// Number of wallets in storage
    pub fn wallet_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;
        Ok(table.len()?)
    }
}
