//! Wallet and ledger types
//!
//! One wallet per beneficiary identity. The transaction list is
//! append-only; the three aggregate counters are derived from it and kept
//! consistent by the ledger, never written directly by callers.

use serde::{Deserialize, Serialize};

/// Beneficiary category a wallet belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerKind {
    Restaurant,
    Hotel,
    Admin,
    DeliveryPartner,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Restaurant => "restaurant",
            OwnerKind::Hotel => "hotel",
            OwnerKind::Admin => "admin",
            OwnerKind::DeliveryPartner => "delivery_partner",
        }
    }
}

/// Wallet owner identity: beneficiary kind plus the entity id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletOwner {
    pub kind: OwnerKind,
    pub id: String,
}

impl WalletOwner {
    pub fn new(kind: OwnerKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Storage key, `kind:id` (same convention as record ids elsewhere)
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

impl std::fmt::Display for WalletOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// Ledger transaction category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Share of an order's money credited to a beneficiary
    Commission,
    /// Cash collected by the beneficiary directly (earned, not held)
    CashCollection,
    Withdrawal,
    Refund,
    Bonus,
    Deduction,
}

/// Transaction state machine: `Pending` may move to any of the other
/// three; `Completed` is terminal and is reversed only by an explicit
/// compensating transaction, never by rewriting history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// A ledger entry embedded in a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub transaction_id: String,
    /// Always positive; the sign of the aggregate effect comes from `tx_type`
    pub amount: f64,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    /// Back-reference only. Several transactions may reference the same
    /// order as long as their types differ.
    pub order_id: Option<String>,
    pub description: String,
    pub created_at: i64,
    pub processed_at: Option<i64>,
}

/// Withdrawal request state machine: Pending → {Approved → Processed, Rejected}
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
}

/// Payout destination details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankTransfer {
        account_number: String,
        ifsc: String,
        holder_name: String,
    },
    Upi {
        vpa: String,
    },
}

/// A beneficiary's request to convert ledger balance into a payout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub request_id: String,
    pub amount: f64,
    pub status: WithdrawalStatus,
    pub payment_method: PaymentMethod,
    /// Links to the withdrawal transaction created at request time
    pub transaction_id: String,
    pub requested_at: i64,
    pub processed_at: Option<i64>,
    pub processed_by: Option<String>,
    pub reject_reason: Option<String>,
}

/// Full wallet state for one beneficiary
///
/// Invariant: `total_balance == total_earned - total_withdrawn` whenever
/// every transaction is terminal. While a withdrawal is pending the debit
/// has already been applied, so the equality holds there too; only
/// non-withdrawal pending transactions can make it transiently false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub owner: WalletOwner,
    pub total_balance: f64,
    pub total_earned: f64,
    pub total_withdrawn: f64,
    pub transactions: Vec<WalletTransaction>,
    pub withdrawal_requests: Vec<WithdrawalRequest>,
    pub last_transaction_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WalletSnapshot {
    pub fn new(owner: WalletOwner) -> Self {
        let now = crate::util::now_millis();
        Self {
            owner,
            total_balance: 0.0,
            total_earned: 0.0,
            total_withdrawn: 0.0,
            transactions: Vec::new(),
            withdrawal_requests: Vec::new(),
            last_transaction_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount available for a new withdrawal request
    pub fn withdrawable(&self) -> f64 {
        self.total_earned - self.total_withdrawn
    }

    pub fn find_transaction(&self, transaction_id: &str) -> Option<&WalletTransaction> {
        self.transactions
            .iter()
            .find(|t| t.transaction_id == transaction_id)
    }

    pub fn find_transaction_mut(&mut self, transaction_id: &str) -> Option<&mut WalletTransaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.transaction_id == transaction_id)
    }

    pub fn find_request(&self, request_id: &str) -> Option<&WithdrawalRequest> {
        self.withdrawal_requests
            .iter()
            .find(|r| r.request_id == request_id)
    }

    pub fn find_request_mut(&mut self, request_id: &str) -> Option<&mut WithdrawalRequest> {
        self.withdrawal_requests
            .iter_mut()
            .find(|r| r.request_id == request_id)
    }

    /// Whether any non-terminal transaction exists (aggregates may be in flux)
    pub fn has_pending_transactions(&self) -> bool {
        self.transactions
            .iter()
            .any(|t| t.status == TransactionStatus::Pending)
    }
}
