use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use corebank_core::{AccountId, LedgerResult, Money, TransactionId};

use crate::ledger::TransactionLedger;
use crate::transaction::{Transaction, TransactionType};

/// One bounded slice of the chronological transaction set.
///
/// Zero-indexed pages; concatenating pages `0..total_pages` reproduces the
/// full set with no duplicates or omissions. A page index past the end is
/// an empty page, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub content: Vec<Transaction>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

/// Account activity over a date window, with balances replayed from the
/// ledger: `opening_balance` is the account's balance just before `from`,
/// `closing_balance` the balance at `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatement {
    pub account_id: AccountId,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub opening_balance: Money,
    pub closing_balance: Money,
    pub transactions: Vec<Transaction>,
}

/// Read-only filtering/pagination views over the ledger.
///
/// Every method works off a single [`TransactionLedger::snapshot`], so a
/// query sees a consistent point-in-time set and never blocks appends.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    ledger: Arc<TransactionLedger>,
}

impl QueryEngine {
    pub fn new(ledger: Arc<TransactionLedger>) -> Self {
        Self { ledger }
    }

    pub fn by_id(&self, transaction_id: TransactionId) -> LedgerResult<Transaction> {
        self.ledger.get(transaction_id)
    }

    /// Full chronological listing.
    pub fn all(&self) -> LedgerResult<Vec<Transaction>> {
        self.ledger.snapshot()
    }

    /// History of one account, chronological. Transfer legs show up on the
    /// account they belong to; the counterparty sits in
    /// `related_account_id`.
    pub fn by_account(&self, account_id: AccountId) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .ledger
            .snapshot()?
            .into_iter()
            .filter(|t| t.account_id == account_id)
            .collect())
    }

    /// Records with `from <= created_at <= to`, sorted by `created_at`
    /// ascending.
    pub fn by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<Transaction>> {
        let mut out: Vec<Transaction> = self
            .ledger
            .snapshot()?
            .into_iter()
            .filter(|t| t.created_at >= from && t.created_at <= to)
            .collect();
        out.sort_by_key(|t| t.created_at);
        Ok(out)
    }

    /// Records with `min <= amount <= max`.
    pub fn by_amount_range(&self, min: Money, max: Money) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .ledger
            .snapshot()?
            .into_iter()
            .filter(|t| t.amount >= min && t.amount <= max)
            .collect())
    }

    /// Zero-indexed page over the full chronological set.
    pub fn paginate(&self, page: usize, size: usize) -> LedgerResult<Page> {
        let all = self.ledger.snapshot()?;
        let total_elements = all.len();
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };

        let content = if size == 0 || page >= total_pages {
            Vec::new()
        } else {
            let start = page * size;
            let end = usize::min(start + size, total_elements);
            all[start..end].to_vec()
        };

        Ok(Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
        })
    }

    /// Statement for `account_id` over `[from, to]`, with opening/closing
    /// balances replayed from the account's full history.
    pub fn account_statement(
        &self,
        account_id: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<AccountStatement> {
        let history = self.by_account(account_id)?;

        let mut opening: i64 = 0;
        let mut closing: i64 = 0;
        let mut in_window = Vec::new();

        for tx in history {
            if tx.created_at < from {
                opening += signed_effect(&tx);
            } else if tx.created_at <= to {
                closing += signed_effect(&tx);
                in_window.push(tx);
            }
        }
        closing += opening;

        Ok(AccountStatement {
            account_id,
            from,
            to,
            opening_balance: Money::from_minor(opening),
            closing_balance: Money::from_minor(closing),
            transactions: in_window,
        })
    }

    /// Statement for one calendar month.
    pub fn monthly_statement(
        &self,
        account_id: AccountId,
        year: i32,
        month: u32,
    ) -> LedgerResult<Option<AccountStatement>> {
        match monthly_window(year, month) {
            Some((from, to)) => self.account_statement(account_id, from, to).map(Some),
            None => Ok(None),
        }
    }
}

/// How one record moves its owning account's balance, in minor units.
fn signed_effect(tx: &Transaction) -> i64 {
    match tx.transaction_type {
        TransactionType::Deposit | TransactionType::TransferIn => tx.amount.minor(),
        TransactionType::Withdraw | TransactionType::TransferOut => -tx.amount.minor(),
    }
}

/// `[first instant, last instant]` of a calendar month, or `None` for an
/// out-of-range year/month.
pub fn monthly_window(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.and_hms_opt(0, 0, 0)?
        - Duration::seconds(1);
    Some((start.and_utc(), end.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionDraft;
    use proptest::prelude::*;

    fn ledger_with_deposits(amounts: &[i64]) -> (Arc<TransactionLedger>, AccountId) {
        let ledger = Arc::new(TransactionLedger::new());
        let account = AccountId::new();
        for &a in amounts {
            ledger
                .append(TransactionDraft::deposit(account, Money::from_units(a), None))
                .unwrap();
        }
        (ledger, account)
    }

    #[test]
    fn by_account_only_returns_that_accounts_records() {
        let ledger = Arc::new(TransactionLedger::new());
        let a = AccountId::new();
        let b = AccountId::new();
        ledger
            .append(TransactionDraft::deposit(a, Money::from_units(1), None))
            .unwrap();
        ledger
            .append_pair(
                TransactionDraft::transfer_out(a, b, Money::from_units(1), None),
                TransactionDraft::transfer_in(b, a, Money::from_units(1), None),
            )
            .unwrap();

        let queries = QueryEngine::new(Arc::clone(&ledger));
        let for_a = queries.by_account(a).unwrap();
        let for_b = queries.by_account(b).unwrap();

        assert_eq!(for_a.len(), 2);
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].transaction_type, TransactionType::TransferIn);
        assert_eq!(for_b[0].related_account_id, Some(a));
    }

    #[test]
    fn date_range_is_inclusive_and_sorted() {
        let (ledger, _) = ledger_with_deposits(&[1, 2, 3]);
        let queries = QueryEngine::new(Arc::clone(&ledger));
        let snapshot = ledger.snapshot().unwrap();

        let from = snapshot.first().unwrap().created_at;
        let to = snapshot.last().unwrap().created_at;
        let hits = queries.by_date_range(from, to).unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let none = queries
            .by_date_range(to + Duration::seconds(1), to + Duration::seconds(2))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn amount_range_is_inclusive() {
        let (ledger, _) = ledger_with_deposits(&[5, 10, 20]);
        let queries = QueryEngine::new(ledger);

        let hits = queries
            .by_amount_range(Money::from_units(5), Money::from_units(10))
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn pagination_slices_without_overlap() {
        let (ledger, _) = ledger_with_deposits(&[1, 2, 3, 4, 5, 6, 7]);
        let queries = QueryEngine::new(ledger);

        let p0 = queries.paginate(0, 3).unwrap();
        let p1 = queries.paginate(1, 3).unwrap();
        let p2 = queries.paginate(2, 3).unwrap();

        assert_eq!(p0.total_pages, 3);
        assert_eq!(p0.total_elements, 7);
        assert_eq!(p0.content.len(), 3);
        assert_eq!(p1.content.len(), 3);
        assert_eq!(p2.content.len(), 1);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let (ledger, _) = ledger_with_deposits(&[1, 2]);
        let queries = QueryEngine::new(ledger);

        let p = queries.paginate(9, 10).unwrap();
        assert!(p.content.is_empty());
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn statement_replays_opening_and_closing_balances() {
        let ledger = Arc::new(TransactionLedger::new());
        let account = AccountId::new();
        ledger
            .append(TransactionDraft::deposit(account, Money::from_units(100), None))
            .unwrap();
        ledger
            .append(TransactionDraft::withdraw(account, Money::from_units(30), None))
            .unwrap();

        let window_start = Utc::now() + Duration::milliseconds(5);
        std::thread::sleep(std::time::Duration::from_millis(10));

        ledger
            .append(TransactionDraft::deposit(account, Money::from_units(25), None))
            .unwrap();

        let queries = QueryEngine::new(ledger);
        let statement = queries
            .account_statement(account, window_start, Utc::now())
            .unwrap();

        assert_eq!(statement.opening_balance, Money::from_units(70));
        assert_eq!(statement.closing_balance, Money::from_units(95));
        assert_eq!(statement.transactions.len(), 1);
    }

    #[test]
    fn monthly_window_covers_the_whole_month() {
        let (from, to) = monthly_window(2026, 2).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-02-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-02-28T23:59:59+00:00");

        let (from, to) = monthly_window(2026, 12).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-12-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-12-31T23:59:59+00:00");

        assert!(monthly_window(2026, 13).is_none());
        assert!(monthly_window(2026, 0).is_none());
    }

    proptest! {
        /// Property: concatenating pages 0..total_pages reproduces the full
        /// chronological set exactly once, for any ledger size and page
        /// size.
        #[test]
        fn pagination_is_complete_and_duplicate_free(
            amounts in prop::collection::vec(1i64..1_000i64, 0..40),
            size in 1usize..10,
        ) {
            let (ledger, _) = ledger_with_deposits(&amounts);
            let queries = QueryEngine::new(Arc::clone(&ledger));

            let total_pages = queries.paginate(0, size).unwrap().total_pages;
            let mut collected = Vec::new();
            for page in 0..total_pages {
                let p = queries.paginate(page, size).unwrap();
                prop_assert!(p.content.len() <= size);
                collected.extend(p.content);
            }

            prop_assert_eq!(collected, ledger.snapshot().unwrap());
        }
    }
}
