use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use corebank_core::{AccountId, TransactionId};

use crate::app::dto::{
    self, AmountRangeParams, DateRangeParams, PageParams, TransferRequest,
};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_transactions))
        .route("/csv", get(export_csv))
        .route("/transfer", post(transfer))
        .route("/account/:id", get(by_account))
        .route("/filter/date", get(by_date_range))
        .route("/filter/amount", get(by_amount_range))
        .route("/:id", get(get_transaction))
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<PageParams>,
) -> axum::response::Response {
    if params.size == 0 {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_page_size", "size must be at least 1");
    }

    match services.queries.paginate(params.page, params.size) {
        Ok(page) => (StatusCode::OK, Json(dto::page_to_json(&page))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services.queries.by_id(TransactionId::from_uuid(id)) {
        Ok(tx) => (StatusCode::OK, Json(dto::transaction_to_json(&tx))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn by_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    let account_id = AccountId::from_uuid(id);
    // Unknown accounts are a 404, not an empty history.
    if let Err(e) = services.accounts.get(account_id) {
        return errors::ledger_error_to_response(e);
    }

    match services.queries.by_account(account_id) {
        Ok(items) => transactions_json(&items),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn by_date_range(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<DateRangeParams>,
) -> axum::response::Response {
    let from = match dto::parse_timestamp(&params.from_date) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let to = match dto::parse_timestamp(&params.to_date) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if from > to {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_date", "fromDate is after toDate");
    }

    match services.queries.by_date_range(from, to) {
        Ok(items) => transactions_json(&items),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn by_amount_range(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<AmountRangeParams>,
) -> axum::response::Response {
    if params.min_amount > params.max_amount {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_amount",
            "minAmount is greater than maxAmount",
        );
    }

    match services
        .queries
        .by_amount_range(params.min_amount, params.max_amount)
    {
        Ok(items) => transactions_json(&items),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<TransferRequest>,
) -> axum::response::Response {
    let result = services.transfers.transfer(
        AccountId::from_uuid(body.sender_id),
        AccountId::from_uuid(body.receiver_id),
        body.amount,
        body.description,
    );

    match result {
        Ok(out_record) => {
            (StatusCode::CREATED, Json(dto::transaction_to_json(&out_record))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn export_csv(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let transactions = match services.queries.all() {
        Ok(items) => items,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.exporter.render_transactions(&transactions) {
        Ok(bytes) => attachment(
            services.exporter.content_type(),
            format!("transactions.{}", services.exporter.file_extension()),
            bytes,
        ),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

fn transactions_json(items: &[corebank_ledger::Transaction]) -> axum::response::Response {
    let body = items.iter().map(dto::transaction_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::Value::Array(body))).into_response()
}

pub(super) fn attachment(
    content_type: &'static str,
    file_name: String,
    bytes: Vec<u8>,
) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        bytes,
    )
        .into_response()
}
