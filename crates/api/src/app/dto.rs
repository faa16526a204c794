use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use corebank_core::Money;
use corebank_ledger::{Account, Page, Transaction};

use crate::app::errors;
use crate::app::services::UserRecord;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_type: String,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DepositWithdrawRequest {
    pub amount: Money,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: Money,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub from_date: String,
    pub to_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRangeParams {
    pub min_amount: Money,
    pub max_amount: Money,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementParams {
    pub account_id: Uuid,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatementParams {
    pub account_id: Uuid,
    pub year: i32,
    pub month: u32,
}

/// Parse a caller-supplied timestamp. The original UI sends ISO local
/// datetimes without an offset, so both RFC 3339 and naive forms are
/// accepted; bare dates mean midnight UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, axum::response::Response> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(errors::json_error(
        StatusCode::BAD_REQUEST,
        "invalid_date",
        format!("'{s}' is not an ISO date or datetime"),
    ))
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn account_to_json(a: &Account) -> serde_json::Value {
    serde_json::json!({
        "accountId": a.account_id.to_string(),
        "accountNumber": a.account_number,
        "accountType": a.account_type.as_str(),
        "userId": a.user_id.to_string(),
        "balance": a.balance.to_string(),
        "frozen": a.frozen,
        "createdAt": a.created_at.to_rfc3339(),
    })
}

pub fn transaction_to_json(t: &Transaction) -> serde_json::Value {
    serde_json::json!({
        "transactionId": t.transaction_id.to_string(),
        "transactionType": t.transaction_type.as_str(),
        "amount": t.amount.to_string(),
        "accountId": t.account_id.to_string(),
        "relatedAccountId": t.related_account_id.map(|id| id.to_string()),
        "description": t.description,
        "createdAt": t.created_at.to_rfc3339(),
    })
}

pub fn page_to_json(p: &Page) -> serde_json::Value {
    serde_json::json!({
        "content": p.content.iter().map(transaction_to_json).collect::<Vec<_>>(),
        "page": p.page,
        "size": p.size,
        "totalElements": p.total_elements,
        "totalPages": p.total_pages,
    })
}

pub fn user_to_json(u: &UserRecord) -> serde_json::Value {
    serde_json::json!({
        "userId": u.user_id.to_string(),
        "username": u.username,
        "email": u.email,
        "createdAt": u.created_at.to_rfc3339(),
    })
}
