use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corebank_core::{AccountId, LedgerError, LedgerResult, Money, UserId};

/// Product kind of a bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Savings,
    Checking,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Checking => "CHECKING",
        }
    }
}

/// A bank account record.
///
/// Balance mutation goes through [`credit`](Account::credit) and
/// [`debit`](Account::debit) so the frozen gate and the non-negative balance
/// invariant live in one place. Callers are responsible for serializing
/// access (see `store`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: AccountId,
    pub account_number: String,
    pub account_type: AccountType,
    pub user_id: UserId,
    pub balance: Money,
    pub frozen: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: UserId, account_type: AccountType, account_number: String) -> Self {
        Self {
            account_id: AccountId::new(),
            account_number,
            account_type,
            user_id,
            balance: Money::ZERO,
            frozen: false,
            created_at: Utc::now(),
        }
    }

    /// Fail with `AccountFrozen` unless the account accepts mutations.
    pub fn ensure_active(&self) -> LedgerResult<()> {
        if self.frozen {
            return Err(LedgerError::AccountFrozen);
        }
        Ok(())
    }

    /// Add `amount` to the balance. Requires a positive amount and an
    /// unfrozen account.
    pub fn credit(&mut self, amount: Money) -> LedgerResult<()> {
        require_positive(amount)?;
        self.ensure_active()?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        Ok(())
    }

    /// Subtract `amount` from the balance. Requires a positive amount, an
    /// unfrozen account and sufficient funds; the balance never goes
    /// negative.
    pub fn debit(&mut self, amount: Money) -> LedgerResult<()> {
        require_positive(amount)?;
        self.ensure_active()?;
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        Ok(())
    }
}

pub(crate) fn require_positive(amount: Money) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::invalid_amount("amount must be greater than zero"));
    }
    Ok(())
}
