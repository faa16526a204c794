use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    routing::get,
    Router,
};

use corebank_core::AccountId;
use corebank_ledger::AccountStatement;

use crate::app::dto::{self, MonthlyStatementParams, StatementParams};
use crate::app::errors;
use crate::app::routes::transactions::attachment;
use crate::app::services::AppServices;

/// Statement endpoints compute balances and history in the ledger core and
/// hand the result to the wired [`StatementExporter`] for rendering. The
/// default build ships the CSV exporter; a PDF renderer plugs in behind the
/// same seam without touching these handlers.
///
/// [`StatementExporter`]: corebank_ledger::StatementExporter
pub fn router() -> Router {
    Router::new()
        .route("/pdf", get(statement))
        .route("/monthly-pdf", get(monthly_statement))
}

pub async fn statement(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<StatementParams>,
) -> axum::response::Response {
    let account_id = AccountId::from_uuid(params.account_id);
    if let Err(e) = services.accounts.get(account_id) {
        return errors::ledger_error_to_response(e);
    }

    let from = match dto::parse_timestamp(&params.from) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let to = match dto::parse_timestamp(&params.to) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if from > to {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_date", "from is after to");
    }

    match services.queries.account_statement(account_id, from, to) {
        Ok(statement) => render(&services, &statement, format!("statement-{account_id}")),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn monthly_statement(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<MonthlyStatementParams>,
) -> axum::response::Response {
    let account_id = AccountId::from_uuid(params.account_id);
    if let Err(e) = services.accounts.get(account_id) {
        return errors::ledger_error_to_response(e);
    }

    match services
        .queries
        .monthly_statement(account_id, params.year, params.month)
    {
        Ok(Some(statement)) => render(
            &services,
            &statement,
            format!("statement-{}-{:04}-{:02}", account_id, params.year, params.month),
        ),
        Ok(None) => errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_date",
            "year/month is out of range",
        ),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

fn render(
    services: &AppServices,
    statement: &AccountStatement,
    file_stem: String,
) -> axum::response::Response {
    match services.exporter.render_statement(statement) {
        Ok(bytes) => attachment(
            services.exporter.content_type(),
            format!("{file_stem}.{}", services.exporter.file_extension()),
            bytes,
        ),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
