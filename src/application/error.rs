use thiserror::Error;

use crate::domain::{AccountId, Cents, format_cents};

/// Every failure is a caller-input problem: none of them leave a trace in the
/// ledger, and none of them is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error(
        "Insufficient funds in account {account}: balance {}, required {}",
        format_cents(*.balance),
        format_cents(*.required)
    )]
    InsufficientFunds {
        account: AccountId,
        balance: Cents,
        required: Cents,
    },
}

impl LedgerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        LedgerError::InvalidArgument(message.into())
    }
}
