//! Wire types for the HTTP API.
//!
//! Money travels as JSON numbers in major units ("12.5" means 1250 cents)
//! and is converted to and from `Cents` here, never inside the ledger.
//! `serde_json` keeps numbers as their decimal text, so no amount passes
//! through `f64` on the way in or out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::application::{AccountInfo, BalanceEntry};
use crate::domain::{
    AccountId, Cents, EntryKind, ParseCentsError, TransactionRecord, format_cents, parse_cents,
};

/// Convert a JSON number into cents, rejecting sub-cent precision.
pub fn number_to_cents(number: &Number) -> Result<Cents, ParseCentsError> {
    parse_cents(&number.to_string())
}

/// Render cents as a JSON number in major units: 7000 -> 70, 1230 -> 12.3
pub fn cents_to_number(cents: Cents) -> Number {
    if cents % 100 == 0 {
        return Number::from(cents / 100);
    }
    let text = format_cents(cents);
    text.trim_end_matches('0')
        .parse()
        .unwrap_or_else(|_| Number::from(cents / 100))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: Option<String>,
    pub initial_balance: Option<Number>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    pub message: &'static str,
    pub account_id: AccountId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub account_id: String,
    pub balance: Number,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub amount: Option<Number>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub message: &'static str,
    pub from_account_balance: Number,
}

/// A history record as seen by API clients: debits name the receiving
/// account in `to`, credits name the sending account in `from`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: Number,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<AccountId>,
    pub date: DateTime<Utc>,
    pub transfer_id: String,
}

impl From<TransactionRecord> for TransactionView {
    fn from(record: TransactionRecord) -> Self {
        let (to, from) = match record.kind {
            EntryKind::Debit => (Some(record.counterparty), None),
            EntryKind::Credit => (None, Some(record.counterparty)),
        };
        Self {
            kind: record.kind,
            amount: cents_to_number(record.amount),
            to,
            from,
            date: record.timestamp,
            transfer_id: record.transfer_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub account_id: String,
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoResponse {
    pub account_id: AccountId,
    pub name: String,
    pub balance: Number,
    pub initial_balance: Number,
    pub created_at: DateTime<Utc>,
    pub debit_count: usize,
    pub credit_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

impl From<AccountInfo> for AccountInfoResponse {
    fn from(info: AccountInfo) -> Self {
        Self {
            account_id: info.id,
            name: info.name,
            balance: cents_to_number(info.balance),
            initial_balance: cents_to_number(info.opening_balance),
            created_at: info.created_at,
            debit_count: info.debit_count,
            credit_count: info.credit_count,
            last_activity: info.last_activity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub name: String,
    pub balance: Number,
}

impl From<BalanceEntry> for AccountSummary {
    fn from(entry: BalanceEntry) -> Self {
        Self {
            account_id: entry.id,
            name: entry.name,
            balance: cents_to_number(entry.balance),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountSummary>,
}
