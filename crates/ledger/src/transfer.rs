use std::sync::Arc;

use corebank_core::{AccountId, LedgerError, LedgerResult, Money};

use crate::account::require_positive;
use crate::ledger::TransactionLedger;
use crate::store::{lock_cell, AccountStore};
use crate::transaction::{Transaction, TransactionDraft};

/// Orchestrates atomic two-account transfers on top of the store and the
/// ledger.
#[derive(Debug, Clone)]
pub struct TransferCoordinator {
    accounts: Arc<AccountStore>,
    ledger: Arc<TransactionLedger>,
}

impl TransferCoordinator {
    pub fn new(accounts: Arc<AccountStore>, ledger: Arc<TransactionLedger>) -> Self {
        Self { accounts, ledger }
    }

    /// Move `amount` from `sender_id` to `receiver_id`.
    ///
    /// Either both balance changes and both ledger records commit, or
    /// nothing does. Both account locks are held across the commit and are
    /// always acquired in ascending account-id order, so two concurrent
    /// transfers between the same pair in opposite directions cannot
    /// deadlock.
    ///
    /// Returns the sender-side `TRANSFER_OUT` record.
    pub fn transfer(
        &self,
        sender_id: AccountId,
        receiver_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> LedgerResult<Transaction> {
        require_positive(amount)?;
        if sender_id == receiver_id {
            return Err(LedgerError::invalid_transfer(
                "sender and receiver must be different accounts",
            ));
        }

        let sender_cell = self.accounts.cell(sender_id)?;
        let receiver_cell = self.accounts.cell(receiver_id)?;

        // Fixed total lock order, independent of sender/receiver role.
        let sender_first = sender_id < receiver_id;
        let (first, second) = if sender_first {
            (&sender_cell, &receiver_cell)
        } else {
            (&receiver_cell, &sender_cell)
        };
        let mut first_guard = lock_cell(first)?;
        let mut second_guard = lock_cell(second)?;
        let (sender, receiver) = if sender_first {
            (&mut *first_guard, &mut *second_guard)
        } else {
            (&mut *second_guard, &mut *first_guard)
        };

        sender.ensure_live()?;
        receiver.ensure_live()?;
        sender.account.ensure_active()?;
        receiver.account.ensure_active()?;

        let new_sender_balance = sender
            .account
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds)?;
        if new_sender_balance.is_negative() {
            return Err(LedgerError::InsufficientFunds);
        }
        let new_receiver_balance = receiver
            .account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;

        let out_description = description
            .clone()
            .unwrap_or_else(|| format!("Transfer to account #{}", receiver.account.account_number));
        let in_description = description
            .unwrap_or_else(|| format!("Transfer from account #{}", sender.account.account_number));

        // Append first: if the ledger is unavailable, no balance has moved.
        // Balance assignment below is infallible, and the locks are held
        // until both legs are in place.
        let (out_record, _in_record) = self.ledger.append_pair(
            TransactionDraft::transfer_out(sender_id, receiver_id, amount, Some(out_description)),
            TransactionDraft::transfer_in(receiver_id, sender_id, amount, Some(in_description)),
        )?;

        sender.account.balance = new_sender_balance;
        receiver.account.balance = new_receiver_balance;

        tracing::info!(
            sender = %sender_id,
            receiver = %receiver_id,
            amount = %amount,
            "transfer completed"
        );

        Ok(out_record)
    }
}
