use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::error;

use super::AppState;
use super::dto::{
    AccountInfoResponse, AccountListResponse, BalanceResponse, CreateAccountRequest,
    CreateAccountResponse, HistoryResponse, TransferRequest, TransferResponse, cents_to_number,
    number_to_cents,
};
use super::error::ApiError;

const INVALID_ACCOUNT_DATA: &str = "Invalid account data";
const INVALID_TRANSFER_DATA: &str = "Invalid transfer data";

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(e, INVALID_ACCOUNT_DATA))?;

    let (Some(name), Some(initial_balance)) = (request.name, request.initial_balance) else {
        return Err(ApiError::BadRequest(INVALID_ACCOUNT_DATA));
    };
    let initial_balance = number_to_cents(&initial_balance)
        .map_err(|_| ApiError::BadRequest(INVALID_ACCOUNT_DATA))?;

    let account_id = state.ledger.create_account(&name, initial_balance)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAccountResponse {
            message: "Account created successfully",
            account_id,
        }),
    ))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.balance_of(&account_id)?;

    Ok(Json(BalanceResponse {
        account_id,
        balance: cents_to_number(balance),
    }))
}

pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(e, INVALID_TRANSFER_DATA))?;

    let (Some(from), Some(to), Some(amount)) =
        (request.from_account_id, request.to_account_id, request.amount)
    else {
        return Err(ApiError::BadRequest(INVALID_TRANSFER_DATA));
    };
    let amount =
        number_to_cents(&amount).map_err(|_| ApiError::BadRequest(INVALID_TRANSFER_DATA))?;

    let from_balance = state.ledger.transfer(&from, &to, amount)?;

    Ok(Json(TransferResponse {
        message: "Transfer successful",
        from_account_balance: cents_to_number(from_balance),
    }))
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.ledger.history_of(&account_id)?;

    Ok(Json(HistoryResponse {
        account_id,
        transactions: history.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountInfoResponse>, ApiError> {
    let info = state.ledger.account_info(&account_id)?;
    Ok(Json(info.into()))
}

pub async fn list_accounts(State(state): State<AppState>) -> Json<AccountListResponse> {
    Json(AccountListResponse {
        accounts: state
            .ledger
            .list_accounts()
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}

pub async fn check_integrity(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.ledger.check_integrity();
    if report.is_healthy() {
        (StatusCode::OK, Json(report))
    } else {
        error!(issues = report.issues.len(), "Ledger integrity check failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(report))
    }
}
