use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use corebank_core::{LedgerError, LedgerResult, TransactionId};

use crate::transaction::{Transaction, TransactionDraft};

/// Append-only record of completed monetary events.
///
/// The write path is deliberately minimal: assign id + timestamp, push,
/// done. Everything read-shaped (filtering, pagination, statements) lives
/// in [`QueryEngine`](crate::query::QueryEngine), which works off
/// [`snapshot`](TransactionLedger::snapshot).
#[derive(Debug, Default)]
pub struct TransactionLedger {
    inner: RwLock<LedgerInner>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    /// Chronological log. Records are never updated or removed.
    log: Vec<Transaction>,
    index: HashMap<TransactionId, usize>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record, assigning its id and server-side timestamp.
    pub fn append(&self, draft: TransactionDraft) -> LedgerResult<Transaction> {
        let mut inner = self.write()?;
        let stored = Self::store(&mut inner, draft, Utc::now());
        Ok(stored)
    }

    /// Append the two legs of a transfer in one write critical section, so
    /// no snapshot ever contains one leg without the other. Both records
    /// share a timestamp.
    pub fn append_pair(
        &self,
        first: TransactionDraft,
        second: TransactionDraft,
    ) -> LedgerResult<(Transaction, Transaction)> {
        let mut inner = self.write()?;
        let at = Utc::now();
        let a = Self::store(&mut inner, first, at);
        let b = Self::store(&mut inner, second, at);
        Ok((a, b))
    }

    pub fn get(&self, transaction_id: TransactionId) -> LedgerResult<Transaction> {
        let inner = self
            .inner
            .read()
            .map_err(|_| LedgerError::unavailable("ledger lock poisoned"))?;
        inner
            .index
            .get(&transaction_id)
            .map(|&i| inner.log[i].clone())
            .ok_or(LedgerError::NotFound)
    }

    /// Consistent point-in-time copy of the log, in append order.
    pub fn snapshot(&self) -> LedgerResult<Vec<Transaction>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| LedgerError::unavailable("ledger lock poisoned"))?;
        Ok(inner.log.clone())
    }

    pub fn len(&self) -> LedgerResult<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| LedgerError::unavailable("ledger lock poisoned"))?;
        Ok(inner.log.len())
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    fn write(&self) -> LedgerResult<std::sync::RwLockWriteGuard<'_, LedgerInner>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::unavailable("ledger lock poisoned"))
    }

    fn store(
        inner: &mut LedgerInner,
        draft: TransactionDraft,
        at: chrono::DateTime<Utc>,
    ) -> Transaction {
        let stored = Transaction {
            transaction_id: TransactionId::new(),
            transaction_type: draft.transaction_type,
            amount: draft.amount,
            account_id: draft.account_id,
            related_account_id: draft.related_account_id,
            description: draft.description,
            created_at: at,
        };
        inner.index.insert(stored.transaction_id, inner.log.len());
        inner.log.push(stored.clone());
        stored
    }
}
