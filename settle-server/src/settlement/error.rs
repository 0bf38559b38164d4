//! Settlement error types

use crate::commission::CommissionError;
use crate::db::repository::RepoError;
use crate::wallet::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Commission(#[from] CommissionError),

    #[error("Distribution not applicable: {0}")]
    NotApplicable(String),

    #[error(
        "Partial distribution failure for order {order_id}: credited {credited:?}, \
         failed at {failed}: {message}"
    )]
    PartialFailure {
        order_id: String,
        /// Owner keys whose credits succeeded before the failure
        credited: Vec<String>,
        /// Owner key whose credit failed
        failed: String,
        message: String,
    },
}

pub type SettlementResult<T> = Result<T, SettlementError>;
