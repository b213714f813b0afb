use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Cents};

pub type TransferId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Money left the account
    Debit,
    /// Money entered the account
    Credit,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Debit => "Debit",
            EntryKind::Credit => "Credit",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a committed transfer, as seen from a single account.
/// Records are immutable once appended to an account's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: EntryKind,
    /// Amount in cents (always positive)
    pub amount: Cents,
    /// The other account involved in the transfer
    pub counterparty: AccountId,
    /// Commit time, shared by both sides of the transfer
    pub timestamp: DateTime<Utc>,
    /// Shared by both sides of the transfer
    pub transfer_id: TransferId,
}

impl TransactionRecord {
    pub fn debit(
        transfer_id: TransferId,
        amount: Cents,
        to: AccountId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        debug_assert!(amount > 0, "Transaction amount must be positive");
        Self {
            kind: EntryKind::Debit,
            amount,
            counterparty: to,
            timestamp,
            transfer_id,
        }
    }

    pub fn credit(
        transfer_id: TransferId,
        amount: Cents,
        from: AccountId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        debug_assert!(amount > 0, "Transaction amount must be positive");
        Self {
            kind: EntryKind::Credit,
            amount,
            counterparty: from,
            timestamp,
            transfer_id,
        }
    }

    /// Signed effect on the owning account's balance.
    pub fn signed_amount(&self) -> Cents {
        match self.kind {
            EntryKind::Debit => -self.amount,
            EntryKind::Credit => self.amount,
        }
    }

    /// Returns true if `other` is the opposite side of the same transfer,
    /// given the accounts owning each record.
    pub fn pairs_with(
        &self,
        owner: AccountId,
        other: &TransactionRecord,
        other_owner: AccountId,
    ) -> bool {
        self.transfer_id == other.transfer_id
            && self.kind != other.kind
            && self.amount == other.amount
            && self.timestamp == other.timestamp
            && self.counterparty == other_owner
            && other.counterparty == owner
    }
}
