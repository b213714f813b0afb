use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, EntryKind, TransactionRecord};

/// Account identifier, issued by the store from a counter starting at 1.
///
/// On the wire it is an opaque string. Only the canonical decimal rendering
/// parses, so "01" or "+1" never alias account "1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AccountId(u64);

impl AccountId {
    pub const FIRST: AccountId = AccountId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier issued after this one.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAccountId(pub String);

impl fmt::Display for InvalidAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid account id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidAccountId {}

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && !(s.len() > 1 && s.starts_with('0'));
        if !canonical {
            return Err(InvalidAccountId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidAccountId(s.to_string()))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Mutable state of one account. Only the ledger service writes to it, and
/// only while holding the account's write lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Current balance in cents, never negative
    pub balance: Cents,
    /// Balance the account was created with
    pub opening_balance: Cents,
    pub created_at: DateTime<Utc>,
    /// Append-only, oldest first
    pub history: Vec<TransactionRecord>,
}

impl Account {
    pub fn new(id: AccountId, name: String, opening_balance: Cents) -> Self {
        Self {
            id,
            name,
            balance: opening_balance,
            opening_balance,
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    pub fn debit_count(&self) -> usize {
        self.count_kind(EntryKind::Debit)
    }

    pub fn credit_count(&self) -> usize {
        self.count_kind(EntryKind::Credit)
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|record| record.timestamp)
    }

    fn count_kind(&self, kind: EntryKind) -> usize {
        self.history.iter().filter(|r| r.kind == kind).count()
    }
}
