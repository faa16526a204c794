use corebank_core::{LedgerError, LedgerResult};

use crate::query::AccountStatement;
use crate::transaction::Transaction;

/// Rendering seam for statement/history exports.
///
/// The ledger core hands a query result sequence to an exporter and stays
/// out of presentation concerns. CSV ships here; richer renderers (PDF)
/// live with the presentation stack and plug in behind this trait.
pub trait StatementExporter: Send + Sync {
    /// MIME type of the rendered output.
    fn content_type(&self) -> &'static str;

    /// File extension for download attachments, without the dot.
    fn file_extension(&self) -> &'static str;

    fn render_transactions(&self, transactions: &[Transaction]) -> LedgerResult<Vec<u8>>;

    fn render_statement(&self, statement: &AccountStatement) -> LedgerResult<Vec<u8>>;
}

/// CSV renderer: one header row, one row per transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    fn write_rows(
        writer: &mut csv::Writer<Vec<u8>>,
        transactions: &[Transaction],
    ) -> Result<(), csv::Error> {
        writer.write_record([
            "transactionId",
            "type",
            "accountId",
            "relatedAccountId",
            "amount",
            "description",
            "createdAt",
        ])?;
        for tx in transactions {
            writer.write_record([
                tx.transaction_id.to_string(),
                tx.transaction_type.as_str().to_string(),
                tx.account_id.to_string(),
                tx.related_account_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                tx.amount.to_string(),
                tx.description.clone().unwrap_or_default(),
                tx.created_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }

    fn finish(writer: csv::Writer<Vec<u8>>) -> LedgerResult<Vec<u8>> {
        writer
            .into_inner()
            .map_err(|e| LedgerError::unavailable(format!("csv rendering failed: {e}")))
    }
}

impl StatementExporter for CsvExporter {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render_transactions(&self, transactions: &[Transaction]) -> LedgerResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        Self::write_rows(&mut writer, transactions)
            .map_err(|e| LedgerError::unavailable(format!("csv rendering failed: {e}")))?;
        Self::finish(writer)
    }

    fn render_statement(&self, statement: &AccountStatement) -> LedgerResult<Vec<u8>> {
        // Summary rows have a different width than transaction rows.
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

        writer
            .write_record(["accountId", "from", "to", "openingBalance", "closingBalance"])
            .and_then(|_| {
                writer.write_record([
                    statement.account_id.to_string(),
                    statement.from.to_rfc3339(),
                    statement.to.to_rfc3339(),
                    statement.opening_balance.to_string(),
                    statement.closing_balance.to_string(),
                ])
            })
            .and_then(|_| Self::write_rows(&mut writer, &statement.transactions))
            .map_err(|e| LedgerError::unavailable(format!("csv rendering failed: {e}")))?;

        Self::finish(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TransactionDraft, TransactionType};
    use crate::TransactionLedger;
    use corebank_core::{AccountId, Money};

    #[test]
    fn renders_header_and_one_row_per_transaction() {
        let ledger = TransactionLedger::new();
        let account = AccountId::new();
        ledger
            .append(TransactionDraft::deposit(
                account,
                Money::from_units(10),
                Some("first, with a comma".to_string()),
            ))
            .unwrap();
        ledger
            .append(TransactionDraft::withdraw(account, Money::from_units(3), None))
            .unwrap();

        let bytes = CsvExporter::new()
            .render_transactions(&ledger.snapshot().unwrap())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("transactionId,type,accountId"));
        assert!(lines[1].contains(TransactionType::Deposit.as_str()));
        // Field with a comma must be quoted.
        assert!(lines[1].contains("\"first, with a comma\""));
        assert!(lines[2].contains("3.00"));
    }

    #[test]
    fn statement_render_leads_with_the_balance_summary() {
        use crate::query::QueryEngine;
        use chrono::{Duration, Utc};
        use std::sync::Arc;

        let ledger = Arc::new(TransactionLedger::new());
        let account = AccountId::new();
        ledger
            .append(TransactionDraft::deposit(account, Money::from_units(50), None))
            .unwrap();

        let statement = QueryEngine::new(ledger)
            .account_statement(account, Utc::now() - Duration::hours(1), Utc::now())
            .unwrap();

        let bytes = CsvExporter::new().render_statement(&statement).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("accountId,from,to,openingBalance,closingBalance"));
        assert!(lines[1].contains("0.00"));
        assert!(lines[1].contains("50.00"));
        assert_eq!(lines.len(), 4);
    }
}
