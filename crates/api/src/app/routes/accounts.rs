use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use corebank_core::{AccountId, UserId};

use crate::app::dto::{self, CreateAccountRequest, DepositWithdrawRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_account).get(list_accounts))
        .route("/:id", get(get_account).delete(delete_account))
        .route("/:id/freeze", put(freeze_account))
        .route("/:id/unfreeze", put(unfreeze_account))
        .route("/:id/deposit", post(deposit))
        .route("/:id/withdraw", post(withdraw))
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CreateAccountRequest>,
) -> axum::response::Response {
    let account_type = match errors::parse_account_type(&body.account_type) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    // Accounts must belong to a known user.
    let user_id = UserId::from_uuid(body.user_id);
    if let Err(e) = services.users.get(user_id) {
        return errors::ledger_error_to_response(e);
    }

    match services.accounts.create(user_id, account_type) {
        Ok(account) => {
            (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.accounts.list() {
        Ok(accounts) => {
            let items = accounts.iter().map(dto::account_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services.accounts.get(AccountId::from_uuid(id)) {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services.accounts.delete(AccountId::from_uuid(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn freeze_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services.accounts.freeze(AccountId::from_uuid(id)) {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn unfreeze_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services.accounts.unfreeze(AccountId::from_uuid(id)) {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
    Json(body): Json<DepositWithdrawRequest>,
) -> axum::response::Response {
    match services.deposit(AccountId::from_uuid(id), body.amount, body.description) {
        Ok((account, _record)) => {
            (StatusCode::OK, Json(dto::account_to_json(&account))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
    Json(body): Json<DepositWithdrawRequest>,
) -> axum::response::Response {
    match services.withdraw(AccountId::from_uuid(id), body.amount, body.description) {
        Ok((account, _record)) => {
            (StatusCode::OK, Json(dto::account_to_json(&account))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
