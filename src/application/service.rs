use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, Cents, IntegrityReport, TransactionRecord, build_integrity_report,
};
use crate::storage::{AccountHandle, AccountStore};

use super::LedgerError;

/// The ledger engine: the only writer of balances and histories.
/// This is the primary interface for any client (HTTP, tests, tooling).
///
/// Locking discipline:
/// - the account map sits behind `store`; it is held only to create an
///   account or to clone handles, never while an account lock is taken;
/// - every account has its own `RwLock`; multi-account operations take those
///   locks in ascending id order, so waiters can never form a cycle.
///
/// Poisoned locks are recovered: every mutation validates before it writes,
/// so a panic can never leave a half-applied transfer behind a lock.
pub struct LedgerService {
    store: RwLock<AccountStore>,
}

/// Detailed account information
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: AccountId,
    pub name: String,
    pub balance: Cents,
    pub opening_balance: Cents,
    pub created_at: DateTime<Utc>,
    pub debit_count: usize,
    pub credit_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Balance entry for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceEntry {
    pub id: AccountId,
    pub name: String,
    pub balance: Cents,
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerService {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::with_store(AccountStore::new())
    }

    /// Create a ledger over an existing store.
    pub fn with_store(store: AccountStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account funded with `initial_balance`.
    #[instrument(skip(self))]
    pub fn create_account(
        &self,
        name: &str,
        initial_balance: Cents,
    ) -> Result<AccountId, LedgerError> {
        let id = self
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .create_account(name, initial_balance)
            .inspect_err(|err| debug!(error = %err, "Account creation rejected"))?;

        info!(account_id = %id, initial_balance, "Account created");
        Ok(id)
    }

    /// Current balance of an account.
    pub fn balance_of(&self, id: &str) -> Result<Cents, LedgerError> {
        let handle = self.resolve(id)?;
        let account = read(&handle);
        Ok(account.balance)
    }

    /// Committed records of an account, oldest first.
    pub fn history_of(&self, id: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
        let handle = self.resolve(id)?;
        let account = read(&handle);
        Ok(account.history.clone())
    }

    /// Get detailed account information.
    pub fn account_info(&self, id: &str) -> Result<AccountInfo, LedgerError> {
        let handle = self.resolve(id)?;
        let account = read(&handle);
        Ok(AccountInfo {
            id: account.id,
            name: account.name.clone(),
            balance: account.balance,
            opening_balance: account.opening_balance,
            created_at: account.created_at,
            debit_count: account.debit_count(),
            credit_count: account.credit_count(),
            last_activity: account.last_activity(),
        })
    }

    /// Balances of all accounts, taken from a single consistent snapshot.
    pub fn list_accounts(&self) -> Vec<BalanceEntry> {
        self.with_snapshot(|accounts| {
            accounts
                .iter()
                .map(|account| BalanceEntry {
                    id: account.id,
                    name: account.name.clone(),
                    balance: account.balance,
                })
                .collect()
        })
    }

    // ========================
    // Transfer operations
    // ========================

    /// Move `amount` cents from one account to another and return the
    /// sender's balance after the transfer.
    ///
    /// Both account locks are held from the sufficiency check through the
    /// commit, so concurrent observers see the transfer entirely or not at all.
    #[instrument(skip(self))]
    pub fn transfer(&self, from: &str, to: &str, amount: Cents) -> Result<Cents, LedgerError> {
        self.try_transfer(from, to, amount)
            .inspect_err(|err| debug!(error = %err, "Transfer rejected"))
    }

    fn try_transfer(&self, from: &str, to: &str, amount: Cents) -> Result<Cents, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::invalid("Amount must be positive"));
        }
        if from.is_empty() || to.is_empty() {
            return Err(LedgerError::invalid(
                "Both source and destination accounts are required",
            ));
        }
        if from == to {
            return Err(LedgerError::invalid(
                "Source and destination accounts must differ",
            ));
        }

        let (from_handle, to_handle) = {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            (store.get(parse_id(from)?)?, store.get(parse_id(to)?)?)
        };

        let (mut sender, mut receiver) = lock_pair(&from_handle, &to_handle);

        if sender.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: sender.id,
                balance: sender.balance,
                required: amount,
            });
        }
        let receiver_balance = receiver.balance.checked_add(amount).ok_or_else(|| {
            LedgerError::invalid(format!(
                "Transfer would overflow the balance of account {}",
                receiver.id
            ))
        })?;

        let transfer_id = Uuid::new_v4();
        let committed_at = Utc::now();

        sender.balance -= amount;
        receiver.balance = receiver_balance;
        sender.history.push(TransactionRecord::debit(
            transfer_id,
            amount,
            receiver.id,
            committed_at,
        ));
        receiver.history.push(TransactionRecord::credit(
            transfer_id,
            amount,
            sender.id,
            committed_at,
        ));

        info!(
            %transfer_id,
            from = %sender.id,
            to = %receiver.id,
            amount,
            "Transfer committed"
        );

        Ok(sender.balance)
    }

    // ========================
    // Integrity operations
    // ========================

    /// Check ledger integrity over a consistent snapshot and return a report.
    pub fn check_integrity(&self) -> IntegrityReport {
        self.with_snapshot(build_integrity_report)
    }

    /// Copy of every account, taken while holding all account read locks.
    pub fn snapshot(&self) -> Vec<Account> {
        self.with_snapshot(<[Account]>::to_vec)
    }

    fn with_snapshot<T>(&self, f: impl FnOnce(&[Account]) -> T) -> T {
        let handles = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handles();

        // Handles come back in ascending id order, the same order transfers lock in.
        let guards: Vec<RwLockReadGuard<'_, Account>> = handles.iter().map(read).collect();
        let accounts: Vec<Account> = guards.iter().map(|guard| (**guard).clone()).collect();
        drop(guards);

        f(&accounts)
    }

    fn resolve(&self, id: &str) -> Result<AccountHandle, LedgerError> {
        let id = parse_id(id)?;
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
    }
}

/// Identifiers are opaque strings to callers; anything that is not a
/// canonical id cannot name an existing account.
fn parse_id(raw: &str) -> Result<AccountId, LedgerError> {
    raw.parse().map_err(|_| LedgerError::NotFound(raw.to_string()))
}

fn read(handle: &AccountHandle) -> RwLockReadGuard<'_, Account> {
    handle.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(handle: &AccountHandle) -> RwLockWriteGuard<'_, Account> {
    handle.write().unwrap_or_else(PoisonError::into_inner)
}

/// Write-lock two distinct accounts in ascending id order and return the
/// guards as (first argument, second argument).
fn lock_pair<'a>(
    first: &'a AccountHandle,
    second: &'a AccountHandle,
) -> (RwLockWriteGuard<'a, Account>, RwLockWriteGuard<'a, Account>) {
    // Ids are immutable, so peeking under a short read lock is enough to order.
    let first_id = read(first).id;
    let second_id = read(second).id;

    if first_id < second_id {
        let a = write(first);
        let b = write(second);
        (a, b)
    } else {
        let b = write(second);
        let a = write(first);
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(accounts: &[(&str, Cents)]) -> LedgerService {
        let ledger = LedgerService::new();
        for (name, balance) in accounts {
            ledger.create_account(name, *balance).unwrap();
        }
        ledger
    }

    #[test]
    fn test_transfer_moves_funds() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 5000)]);

        let remaining = ledger.transfer("1", "2", 3000).unwrap();

        assert_eq!(remaining, 7000);
        assert_eq!(ledger.balance_of("1").unwrap(), 7000);
        assert_eq!(ledger.balance_of("2").unwrap(), 8000);
    }

    #[test]
    fn test_transfer_entire_balance() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 0)]);

        assert_eq!(ledger.transfer("1", "2", 10000).unwrap(), 0);
        assert_eq!(ledger.balance_of("2").unwrap(), 10000);
    }

    #[test]
    fn test_transfer_records_paired_history() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 5000)]);
        ledger.transfer("1", "2", 3000).unwrap();

        let debit = &ledger.history_of("1").unwrap()[0];
        let credit = &ledger.history_of("2").unwrap()[0];

        assert!(debit.pairs_with(AccountId::new(1), credit, AccountId::new(2)));
    }

    #[test]
    fn test_transfer_validation_order() {
        let ledger = ledger_with(&[("Alice", 10000)]);

        // Invalid arguments win over missing accounts
        assert!(matches!(
            ledger.transfer("1", "999", 0),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.transfer("", "999", 100),
            Err(LedgerError::InvalidArgument(_))
        ));
        // Missing accounts win over insufficient funds
        assert_eq!(
            ledger.transfer("1", "999", 1_000_000),
            Err(LedgerError::NotFound("999".to_string()))
        );
    }

    #[test]
    fn test_self_transfer_rejected() {
        let ledger = ledger_with(&[("Alice", 10000)]);

        assert!(matches!(
            ledger.transfer("1", "1", 100),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(ledger.history_of("1").unwrap().is_empty());
    }

    #[test]
    fn test_non_canonical_ids_do_not_resolve() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 0)]);

        assert_eq!(
            ledger.balance_of("01"),
            Err(LedgerError::NotFound("01".to_string()))
        );
        assert_eq!(
            ledger.transfer("01", "2", 100),
            Err(LedgerError::NotFound("01".to_string()))
        );
    }

    #[test]
    fn test_receiver_overflow_is_rejected() {
        let ledger = ledger_with(&[("Alice", 10), ("Whale", Cents::MAX)]);

        assert!(matches!(
            ledger.transfer("1", "2", 10),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert_eq!(ledger.balance_of("1").unwrap(), 10);
        assert_eq!(ledger.balance_of("2").unwrap(), Cents::MAX);
    }

    #[test]
    fn test_lock_pair_returns_guards_in_argument_order() {
        let ledger = ledger_with(&[("Alice", 1), ("Bob", 2)]);
        let store = ledger.store.read().unwrap();
        let alice = store.get(AccountId::new(1)).unwrap();
        let bob = store.get(AccountId::new(2)).unwrap();

        let (a, b) = lock_pair(&bob, &alice);
        assert_eq!(a.name, "Bob");
        assert_eq!(b.name, "Alice");
    }

    #[test]
    fn test_account_info() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 5000)]);
        ledger.transfer("1", "2", 3000).unwrap();
        ledger.transfer("2", "1", 1000).unwrap();
        ledger.transfer("1", "2", 500).unwrap();

        let info = ledger.account_info("1").unwrap();

        assert_eq!(info.name, "Alice");
        assert_eq!(info.balance, 7500);
        assert_eq!(info.opening_balance, 10000);
        assert_eq!(info.debit_count, 2);
        assert_eq!(info.credit_count, 1);
        assert!(info.last_activity.is_some());
    }

    #[test]
    fn test_list_accounts() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 5000)]);
        ledger.transfer("1", "2", 2500).unwrap();

        let entries = ledger.list_accounts();

        assert_eq!(
            entries,
            vec![
                BalanceEntry {
                    id: AccountId::new(1),
                    name: "Alice".into(),
                    balance: 7500,
                },
                BalanceEntry {
                    id: AccountId::new(2),
                    name: "Bob".into(),
                    balance: 7500,
                },
            ]
        );
    }

    #[test]
    fn test_check_integrity_after_transfers() {
        let ledger = ledger_with(&[("Alice", 10000), ("Bob", 5000), ("Carol", 0)]);
        ledger.transfer("1", "2", 3000).unwrap();
        ledger.transfer("2", "3", 4000).unwrap();
        ledger.transfer("3", "1", 1000).unwrap();
        let _ = ledger.transfer("3", "1", 1_000_000);

        let report = ledger.check_integrity();

        assert!(report.is_healthy(), "unexpected issues: {:?}", report.issues);
        assert_eq!(report.transfer_count, 3);
        assert_eq!(report.balance_total, 15000);
    }
}
