use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use uuid::Uuid;

use corebank_core::{AccountId, LedgerError, LedgerResult, Money, UserId};

use crate::account::{require_positive, Account, AccountType};

/// Owns all account records; the unit of mutual exclusion for balance
/// changes.
///
/// Each account lives in its own `Mutex` so concurrent mutations on the
/// same account serialize while different accounts proceed in parallel.
/// The outer registry lock is only held for lookup/insert/remove, never
/// across a balance mutation.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: RwLock<HashMap<AccountId, Arc<Mutex<AccountCell>>>>,
    /// Account numbers ever issued. Numbers of deleted accounts stay here,
    /// so they are not reused.
    numbers: Mutex<HashSet<String>>,
}

/// An account plus its tombstone flag.
///
/// Deletion removes the cell from the registry, but a racing operation may
/// already hold the `Arc`; the flag makes deletion terminal for them too.
#[derive(Debug)]
pub(crate) struct AccountCell {
    pub(crate) account: Account,
    pub(crate) deleted: bool,
}

impl AccountCell {
    /// Fail with `NotFound` once the account has been deleted.
    pub(crate) fn ensure_live(&self) -> LedgerResult<()> {
        if self.deleted {
            return Err(LedgerError::NotFound);
        }
        Ok(())
    }
}

pub(crate) fn lock_cell(cell: &Mutex<AccountCell>) -> LedgerResult<MutexGuard<'_, AccountCell>> {
    cell.lock()
        .map_err(|_| LedgerError::unavailable("account lock poisoned"))
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account for `user_id` with a fresh id, a unique 9-digit
    /// account number and a zero balance.
    pub fn create(&self, user_id: UserId, account_type: AccountType) -> LedgerResult<Account> {
        let number = self.issue_account_number()?;
        let account = Account::new(user_id, account_type, number);

        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| LedgerError::unavailable("account registry lock poisoned"))?;
        accounts.insert(
            account.account_id,
            Arc::new(Mutex::new(AccountCell {
                account: account.clone(),
                deleted: false,
            })),
        );

        tracing::info!(account_id = %account.account_id, user_id = %user_id, "account created");
        Ok(account)
    }

    pub fn get(&self, account_id: AccountId) -> LedgerResult<Account> {
        let cell = self.cell(account_id)?;
        let guard = lock_cell(&cell)?;
        guard.ensure_live()?;
        Ok(guard.account.clone())
    }

    /// All live accounts, ordered by creation (ids are time-ordered).
    pub fn list(&self) -> LedgerResult<Vec<Account>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| LedgerError::unavailable("account registry lock poisoned"))?;

        let mut out = Vec::with_capacity(accounts.len());
        for cell in accounts.values() {
            let guard = lock_cell(cell)?;
            if !guard.deleted {
                out.push(guard.account.clone());
            }
        }
        drop(accounts);

        out.sort_by_key(|a| a.account_id);
        Ok(out)
    }

    /// Delete an account. Terminal: no operation is valid afterwards.
    ///
    /// Rejected with `NonZeroBalance` while the account still holds funds,
    /// so no money disappears with the record.
    pub fn delete(&self, account_id: AccountId) -> LedgerResult<()> {
        let cell = self.cell(account_id)?;
        {
            let mut guard = lock_cell(&cell)?;
            guard.ensure_live()?;
            if !guard.account.balance.is_zero() {
                return Err(LedgerError::NonZeroBalance);
            }
            guard.deleted = true;
        }

        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| LedgerError::unavailable("account registry lock poisoned"))?;
        accounts.remove(&account_id);

        tracing::info!(account_id = %account_id, "account deleted");
        Ok(())
    }

    /// Freeze an account. Idempotent: freezing a frozen account succeeds.
    pub fn freeze(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.set_frozen(account_id, true)
    }

    /// Unfreeze an account. Idempotent as well.
    pub fn unfreeze(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.set_frozen(account_id, false)
    }

    fn set_frozen(&self, account_id: AccountId, frozen: bool) -> LedgerResult<Account> {
        let cell = self.cell(account_id)?;
        let mut guard = lock_cell(&cell)?;
        guard.ensure_live()?;
        if guard.account.frozen != frozen {
            guard.account.frozen = frozen;
            tracing::info!(account_id = %account_id, frozen, "account freeze state changed");
        }
        Ok(guard.account.clone())
    }

    /// Apply `balance += delta` under the account's lock.
    ///
    /// Fails `AccountFrozen` on frozen accounts and `InsufficientFunds` if
    /// the result would go negative; on failure the balance is untouched.
    pub fn adjust_balance(&self, account_id: AccountId, delta: Money) -> LedgerResult<Account> {
        let cell = self.cell(account_id)?;
        let mut guard = lock_cell(&cell)?;
        guard.ensure_live()?;

        if delta.is_negative() {
            guard.account.debit(Money::from_minor(-delta.minor()))?;
        } else {
            guard.account.credit(delta)?;
        }
        Ok(guard.account.clone())
    }

    pub fn deposit(&self, account_id: AccountId, amount: Money) -> LedgerResult<Account> {
        require_positive(amount)?;
        self.adjust_balance(account_id, amount)
    }

    pub fn withdraw(&self, account_id: AccountId, amount: Money) -> LedgerResult<Account> {
        require_positive(amount)?;
        self.adjust_balance(account_id, Money::from_minor(-amount.minor()))
    }

    /// The lockable cell for `account_id`; used by the transfer coordinator
    /// to hold both parties' locks across a two-leg commit.
    pub(crate) fn cell(&self, account_id: AccountId) -> LedgerResult<Arc<Mutex<AccountCell>>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| LedgerError::unavailable("account registry lock poisoned"))?;
        accounts.get(&account_id).cloned().ok_or(LedgerError::NotFound)
    }

    fn issue_account_number(&self) -> LedgerResult<String> {
        let mut numbers = self
            .numbers
            .lock()
            .map_err(|_| LedgerError::unavailable("account number lock poisoned"))?;

        loop {
            let candidate = format!("{:09}", Uuid::new_v4().as_u128() % 1_000_000_000);
            if numbers.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn store_with_account() -> (AccountStore, Account) {
        let store = AccountStore::new();
        let account = store.create(UserId::new(), AccountType::Checking).unwrap();
        (store, account)
    }

    #[test]
    fn create_assigns_unique_number_and_zero_balance() {
        let store = AccountStore::new();
        let a = store.create(UserId::new(), AccountType::Savings).unwrap();
        let b = store.create(UserId::new(), AccountType::Checking).unwrap();

        assert_eq!(a.balance, Money::ZERO);
        assert!(!a.frozen);
        assert_eq!(a.account_number.len(), 9);
        assert_ne!(a.account_number, b.account_number);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn get_unknown_account_is_not_found() {
        let store = AccountStore::new();
        assert_eq!(store.get(AccountId::new()).unwrap_err(), LedgerError::NotFound);
    }

    #[test]
    fn deposit_and_withdraw_follow_the_balance() {
        let (store, account) = store_with_account();
        let id = account.account_id;

        let after = store.deposit(id, Money::from_units(100)).unwrap();
        assert_eq!(after.balance, Money::from_units(100));

        let after = store.withdraw(id, Money::from_units(40)).unwrap();
        assert_eq!(after.balance, Money::from_units(60));
    }

    #[test]
    fn failed_withdraw_leaves_balance_unchanged() {
        let (store, account) = store_with_account();
        let id = account.account_id;
        store.deposit(id, Money::from_units(10)).unwrap();

        let err = store.withdraw(id, Money::from_units(50)).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds);
        assert_eq!(store.get(id).unwrap().balance, Money::from_units(10));
    }

    #[test]
    fn negative_withdraw_amount_is_rejected_before_negation() {
        let (store, account) = store_with_account();
        let err = store
            .withdraw(account.account_id, Money::from_minor(-100))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn freeze_gates_mutations_and_is_idempotent() {
        let (store, account) = store_with_account();
        let id = account.account_id;
        store.deposit(id, Money::from_units(5)).unwrap();

        store.freeze(id).unwrap();
        let again = store.freeze(id).unwrap();
        assert!(again.frozen);

        assert_eq!(
            store.deposit(id, Money::from_units(1)).unwrap_err(),
            LedgerError::AccountFrozen
        );
        assert_eq!(store.get(id).unwrap().balance, Money::from_units(5));

        store.unfreeze(id).unwrap();
        store.unfreeze(id).unwrap();
        store.deposit(id, Money::from_units(1)).unwrap();
        assert_eq!(store.get(id).unwrap().balance, Money::from_units(6));
    }

    #[test]
    fn delete_requires_zero_balance_and_is_terminal() {
        let (store, account) = store_with_account();
        let id = account.account_id;
        store.deposit(id, Money::from_units(1)).unwrap();

        assert_eq!(store.delete(id).unwrap_err(), LedgerError::NonZeroBalance);

        store.withdraw(id, Money::from_units(1)).unwrap();
        store.delete(id).unwrap();

        assert_eq!(store.get(id).unwrap_err(), LedgerError::NotFound);
        assert_eq!(store.delete(id).unwrap_err(), LedgerError::NotFound);
        assert_eq!(
            store.deposit(id, Money::from_units(1)).unwrap_err(),
            LedgerError::NotFound
        );
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn concurrent_deposits_on_one_account_do_not_lose_updates() {
        let (store, account) = store_with_account();
        let store = Arc::new(store);
        let id = account.account_id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.deposit(id, Money::from_units(1)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.get(id).unwrap().balance, Money::from_units(800));
    }
}
