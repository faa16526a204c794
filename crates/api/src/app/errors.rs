use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use corebank_core::LedgerError;
use corebank_ledger::AccountType;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        LedgerError::InvalidAmount(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_amount", msg)
        }
        LedgerError::InsufficientFunds => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_funds", "insufficient funds")
        }
        LedgerError::AccountFrozen => {
            json_error(StatusCode::FORBIDDEN, "account_frozen", "account is frozen")
        }
        LedgerError::InvalidTransfer(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_transfer", msg)
        }
        LedgerError::NonZeroBalance => json_error(
            StatusCode::CONFLICT,
            "non_zero_balance",
            "account balance must be zero before deletion",
        ),
        LedgerError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
        }
        LedgerError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_account_type(s: &str) -> Result<AccountType, axum::response::Response> {
    match s.to_uppercase().as_str() {
        "SAVINGS" => Ok(AccountType::Savings),
        "CHECKING" => Ok(AccountType::Checking),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_account_type",
            "accountType must be one of: SAVINGS, CHECKING",
        )),
    }
}
