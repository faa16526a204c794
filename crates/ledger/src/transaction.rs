use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corebank_core::{AccountId, Money, TransactionId};

/// Kind of a completed monetary event, from the owning account's point of
/// view. A transfer is recorded twice: `TransferOut` on the sender and
/// `TransferIn` on the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::TransferIn => "TRANSFER_IN",
            TransactionType::TransferOut => "TRANSFER_OUT",
        }
    }
}

/// Immutable record of a completed monetary event.
///
/// `transaction_id` and `created_at` are assigned by the ledger at append
/// time, never by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub account_id: AccountId,
    /// Counterparty account; present exactly for `TransferIn`/`TransferOut`.
    pub related_account_id: Option<AccountId>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What a caller hands to the ledger; the stored [`Transaction`] comes back
/// with id and timestamp filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub account_id: AccountId,
    pub related_account_id: Option<AccountId>,
    pub description: Option<String>,
}

impl TransactionDraft {
    pub fn deposit(account_id: AccountId, amount: Money, description: Option<String>) -> Self {
        Self {
            transaction_type: TransactionType::Deposit,
            amount,
            account_id,
            related_account_id: None,
            description,
        }
    }

    pub fn withdraw(account_id: AccountId, amount: Money, description: Option<String>) -> Self {
        Self {
            transaction_type: TransactionType::Withdraw,
            amount,
            account_id,
            related_account_id: None,
            description,
        }
    }

    pub fn transfer_out(
        sender: AccountId,
        receiver: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Self {
        Self {
            transaction_type: TransactionType::TransferOut,
            amount,
            account_id: sender,
            related_account_id: Some(receiver),
            description,
        }
    }

    pub fn transfer_in(
        receiver: AccountId,
        sender: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Self {
        Self {
            transaction_type: TransactionType::TransferIn,
            amount,
            account_id: receiver,
            related_account_id: Some(sender),
            description,
        }
    }
}
