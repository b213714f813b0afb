use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::application::LedgerError;
use crate::domain::{Account, AccountId, Cents};

/// Shared handle to one account's state.
///
/// The store hands these out but never locks them itself; reading or writing
/// through a handle is only sound under `LedgerService`'s locking order.
pub type AccountHandle = Arc<RwLock<Account>>;

/// In-memory identity and storage for accounts.
///
/// Not thread-safe on its own: creation needs `&mut self`, so the owner must
/// serialize access to the map and the id counter.
#[derive(Debug)]
pub struct AccountStore {
    accounts: BTreeMap<AccountId, AccountHandle>,
    next_id: AccountId,
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            next_id: AccountId::FIRST,
        }
    }

    /// Create a new account and return its freshly issued identifier.
    /// On error neither the map nor the counter changes.
    pub fn create_account(
        &mut self,
        name: &str,
        initial_balance: Cents,
    ) -> Result<AccountId, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::invalid("Account name must not be empty"));
        }
        if initial_balance < 0 {
            return Err(LedgerError::invalid(format!(
                "Initial balance must not be negative, got {}",
                initial_balance
            )));
        }

        let id = self.next_id;
        let following = id
            .next()
            .ok_or_else(|| LedgerError::invalid("Account identifiers exhausted"))?;

        let account = Account::new(id, name.to_string(), initial_balance);
        self.accounts.insert(id, Arc::new(RwLock::new(account)));
        self.next_id = following;
        Ok(id)
    }

    /// Look up an account handle.
    pub fn get(&self, id: AccountId) -> Result<AccountHandle, LedgerError> {
        self.accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    /// All account handles in ascending id order.
    pub fn handles(&self) -> Vec<AccountHandle> {
        self.accounts.values().cloned().collect()
    }

    /// The identifier the next successful `create_account` will return.
    pub fn peek_next_id(&self) -> AccountId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
