use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corebank_auth::Hs256Jwt;
use corebank_core::{AccountId, LedgerError, LedgerResult, Money, UserId};
use corebank_ledger::{
    Account, AccountStore, CsvExporter, QueryEngine, StatementExporter, Transaction,
    TransactionDraft, TransactionLedger, TransferCoordinator,
};

/// Everything the handlers need, wired once at startup.
pub struct AppServices {
    pub accounts: Arc<AccountStore>,
    pub ledger: Arc<TransactionLedger>,
    pub transfers: TransferCoordinator,
    pub queries: QueryEngine,
    pub exporter: Arc<dyn StatementExporter>,
    pub users: UserDirectory,
    pub tokens: Arc<Hs256Jwt>,
    admin: AdminCredentials,
}

struct AdminCredentials {
    username: String,
    password: String,
    user_id: UserId,
}

pub fn build_services(
    tokens: Arc<Hs256Jwt>,
    admin_username: String,
    admin_password: String,
) -> AppServices {
    let accounts = Arc::new(AccountStore::new());
    let ledger = Arc::new(TransactionLedger::new());
    let transfers = TransferCoordinator::new(Arc::clone(&accounts), Arc::clone(&ledger));
    let queries = QueryEngine::new(Arc::clone(&ledger));

    AppServices {
        accounts,
        ledger,
        transfers,
        queries,
        exporter: Arc::new(CsvExporter::new()),
        users: UserDirectory::new(),
        tokens,
        admin: AdminCredentials {
            username: admin_username,
            password: admin_password,
            user_id: UserId::new(),
        },
    }
}

impl AppServices {
    /// Check login credentials; the returned id becomes the session subject.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<UserId> {
        if username == self.admin.username && password == self.admin.password {
            Some(self.admin.user_id)
        } else {
            None
        }
    }

    /// Deposit into an account and record the event on the ledger.
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> LedgerResult<(Account, Transaction)> {
        tracing::info!(account_id = %account_id, amount = %amount, "deposit requested");
        let account = self.accounts.deposit(account_id, amount)?;
        let description = description
            .unwrap_or_else(|| format!("Deposit to account #{}", account.account_number));
        let record = self
            .ledger
            .append(TransactionDraft::deposit(account_id, amount, Some(description)))?;
        Ok((account, record))
    }

    /// Withdraw from an account and record the event on the ledger.
    pub fn withdraw(
        &self,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> LedgerResult<(Account, Transaction)> {
        tracing::info!(account_id = %account_id, amount = %amount, "withdrawal requested");
        let account = self.accounts.withdraw(account_id, amount)?;
        let description = description
            .unwrap_or_else(|| format!("Withdrawal from account #{}", account.account_number));
        let record = self
            .ledger
            .append(TransactionDraft::withdraw(account_id, amount, Some(description)))?;
        Ok((account, record))
    }
}

/// A user known to the system. Users own accounts but the ledger core only
/// ever holds their id as a foreign reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Minimal in-memory user registry backing the `/users` endpoints and the
/// owner check on account creation.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, username: String, email: String) -> LedgerResult<UserRecord> {
        let record = UserRecord {
            user_id: UserId::new(),
            username,
            email,
            created_at: Utc::now(),
        };

        let mut users = self
            .users
            .write()
            .map_err(|_| LedgerError::unavailable("user directory lock poisoned"))?;
        users.insert(record.user_id, record.clone());
        Ok(record)
    }

    pub fn get(&self, user_id: UserId) -> LedgerResult<UserRecord> {
        let users = self
            .users
            .read()
            .map_err(|_| LedgerError::unavailable("user directory lock poisoned"))?;
        users.get(&user_id).cloned().ok_or(LedgerError::NotFound)
    }

    pub fn list(&self) -> LedgerResult<Vec<UserRecord>> {
        let users = self
            .users
            .read()
            .map_err(|_| LedgerError::unavailable("user directory lock poisoned"))?;
        let mut out: Vec<_> = users.values().cloned().collect();
        out.sort_by_key(|u| u.user_id);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corebank_ledger::AccountType;

    fn services() -> AppServices {
        build_services(
            Arc::new(Hs256Jwt::new(b"test-secret")),
            "admin".to_string(),
            "hunter2".to_string(),
        )
    }

    #[test]
    fn authenticate_checks_both_fields() {
        let s = services();
        assert!(s.authenticate("admin", "hunter2").is_some());
        assert!(s.authenticate("admin", "wrong").is_none());
        assert!(s.authenticate("someone", "hunter2").is_none());
    }

    #[test]
    fn deposit_records_a_described_ledger_entry() {
        let s = services();
        let account = s.accounts.create(UserId::new(), AccountType::Savings).unwrap();

        let (after, record) = s
            .deposit(account.account_id, Money::from_units(25), None)
            .unwrap();

        assert_eq!(after.balance, Money::from_units(25));
        assert_eq!(
            record.description.as_deref(),
            Some(format!("Deposit to account #{}", account.account_number).as_str())
        );
    }

    #[test]
    fn failed_withdrawal_appends_nothing() {
        let s = services();
        let account = s.accounts.create(UserId::new(), AccountType::Savings).unwrap();

        let err = s
            .withdraw(account.account_id, Money::from_units(5), None)
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds);
        assert!(s.ledger.is_empty().unwrap());
    }
}
