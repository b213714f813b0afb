use std::collections::HashMap;

use serde::Serialize;

use super::{Account, AccountId, Cents, EntryKind, TransactionRecord, TransferId};

/// Sum of many `Cents` values. Every balance fits in `Cents`, their sum
/// across accounts or records need not.
pub type CentsTotal = i128;

/// Replay an account's history on top of its opening balance.
/// Balance = opening balance + credits - debits
pub fn replay_balance(account: &Account) -> CentsTotal {
    account
        .history
        .iter()
        .fold(CentsTotal::from(account.opening_balance), |balance, record| {
            balance + CentsTotal::from(record.signed_amount())
        })
}

/// Sum of all amounts of the given kind across every account's history.
pub fn total_by_kind(accounts: &[Account], kind: EntryKind) -> CentsTotal {
    accounts
        .iter()
        .flat_map(|account| account.history.iter())
        .filter(|record| record.kind == kind)
        .map(|record| CentsTotal::from(record.amount))
        .sum()
}

fn total_of(accounts: &[Account], cents: impl Fn(&Account) -> Cents) -> CentsTotal {
    accounts.iter().map(|a| CentsTotal::from(cents(a))).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IntegrityIssue {
    NegativeBalance {
        account: AccountId,
        balance: Cents,
    },
    BalanceMismatch {
        account: AccountId,
        balance: Cents,
        replayed: CentsTotal,
    },
    UnpairedRecord {
        account: AccountId,
        transfer_id: TransferId,
    },
    DebitCreditMismatch {
        debits: CentsTotal,
        credits: CentsTotal,
    },
    ValueNotConserved {
        opening_total: CentsTotal,
        balance_total: CentsTotal,
    },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::NegativeBalance { account, balance } => {
                write!(f, "account {} has negative balance {}", account, balance)
            }
            IntegrityIssue::BalanceMismatch {
                account,
                balance,
                replayed,
            } => write!(
                f,
                "account {} balance {} does not match its history ({})",
                account, balance, replayed
            ),
            IntegrityIssue::UnpairedRecord {
                account,
                transfer_id,
            } => write!(
                f,
                "account {} holds a record of transfer {} without a matching counterpart",
                account, transfer_id
            ),
            IntegrityIssue::DebitCreditMismatch { debits, credits } => write!(
                f,
                "total debits {} differ from total credits {}",
                debits, credits
            ),
            IntegrityIssue::ValueNotConserved {
                opening_total,
                balance_total,
            } => write!(
                f,
                "balances sum to {} but opening balances sum to {}",
                balance_total, opening_total
            ),
        }
    }
}

/// Result of checking a consistent snapshot of the ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub account_count: usize,
    pub transfer_count: usize,
    pub opening_total: CentsTotal,
    pub balance_total: CentsTotal,
    pub debit_total: CentsTotal,
    pub credit_total: CentsTotal,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_balanced(&self) -> bool {
        self.opening_total == self.balance_total && self.debit_total == self.credit_total
    }

    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check conservation, non-negativity and debit/credit pairing over a
/// snapshot of accounts. The snapshot must be taken atomically, otherwise a
/// transfer committed halfway through the copy shows up as an unpaired record.
pub fn build_integrity_report(accounts: &[Account]) -> IntegrityReport {
    let mut issues = Vec::new();

    for account in accounts {
        if account.balance < 0 {
            issues.push(IntegrityIssue::NegativeBalance {
                account: account.id,
                balance: account.balance,
            });
        }
        let replayed = replay_balance(account);
        if replayed != CentsTotal::from(account.balance) {
            issues.push(IntegrityIssue::BalanceMismatch {
                account: account.id,
                balance: account.balance,
                replayed,
            });
        }
    }

    let mut sides: HashMap<TransferId, Vec<(AccountId, &TransactionRecord)>> = HashMap::new();
    for account in accounts {
        for record in &account.history {
            sides
                .entry(record.transfer_id)
                .or_default()
                .push((account.id, record));
        }
    }

    let mut unpaired: Vec<(AccountId, TransferId)> = Vec::new();
    for (transfer_id, records) in &sides {
        let paired = match records.as_slice() {
            [(a, first), (b, second)] => first.pairs_with(*a, second, *b),
            _ => false,
        };
        if !paired {
            unpaired.extend(records.iter().map(|(owner, _)| (*owner, *transfer_id)));
        }
    }
    unpaired.sort();
    issues.extend(
        unpaired
            .into_iter()
            .map(|(account, transfer_id)| IntegrityIssue::UnpairedRecord {
                account,
                transfer_id,
            }),
    );

    let debit_total = total_by_kind(accounts, EntryKind::Debit);
    let credit_total = total_by_kind(accounts, EntryKind::Credit);
    if debit_total != credit_total {
        issues.push(IntegrityIssue::DebitCreditMismatch {
            debits: debit_total,
            credits: credit_total,
        });
    }

    let opening_total = total_of(accounts, |a| a.opening_balance);
    let balance_total = total_of(accounts, |a| a.balance);
    if opening_total != balance_total {
        issues.push(IntegrityIssue::ValueNotConserved {
            opening_total,
            balance_total,
        });
    }

    IntegrityReport {
        account_count: accounts.len(),
        transfer_count: sides.len(),
        opening_total,
        balance_total,
        debit_total,
        credit_total,
        issues,
    }
}
