//! Operator-platform endpoints: wallet provisioning and reads, bet
//! inspection, and manager fund movement.
//!
//! Unlike the provider callbacks these use conventional REST status codes.
//! The caller's identity and role arrive in trusted headers set by the
//! operator gateway (`x-caller-id`, `x-caller-role`); the role is passed
//! into the engine as a precomputed capability, never re-derived here.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use wagerbook::bets::{self, Bet};
use wagerbook::settlement::{
    Caller, CallerRole, PlayerIdentity, SettlementError, TransferRequest,
};
use wagerbook::wallet::{self, LedgerEntry, Wallet, WalletError};

use super::AppState;
use crate::metrics;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Resolve the calling operator from the gateway-set headers.
fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, (StatusCode, Json<ErrorResponse>)> {
    let user_id = headers
        .get("x-caller-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Missing or invalid x-caller-id"))?;

    let role = match headers.get("x-caller-role").and_then(|v| v.to_str().ok()) {
        Some("administrator") => CallerRole::Administrator,
        Some("manager") => CallerRole::Manager,
        _ => CallerRole::Player,
    };

    Ok(Caller::with_role(PlayerIdentity::new(user_id), role))
}

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub user_id: i64,
    #[serde(default)]
    pub opening_balance: i64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Provision a wallet for a newly created account.
pub async fn create_wallet(
    State(state): State<AppState>,
    Json(request): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, Json<ErrorResponse>)> {
    let currency = request.currency.as_deref().unwrap_or("USD");
    match wallet::store::create(&state.pool, request.user_id, request.opening_balance, currency)
        .await
    {
        Ok(wallet) => {
            metrics::operator_calls_total("create_wallet", 201);
            Ok((StatusCode::CREATED, Json(wallet)))
        }
        Err(WalletError::WalletExists(user_id)) => {
            metrics::operator_calls_total("create_wallet", 409);
            Err(error_response(
                StatusCode::CONFLICT,
                format!("Wallet already exists for user {user_id}"),
            ))
        }
        Err(WalletError::InvalidAmount(_)) => {
            metrics::operator_calls_total("create_wallet", 400);
            Err(error_response(
                StatusCode::BAD_REQUEST,
                "Opening balance must not be negative",
            ))
        }
        Err(e) => {
            tracing::error!("Failed to create wallet: {e}");
            metrics::operator_calls_total("create_wallet", 500);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

/// Get the wallet state for a user.
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Wallet>, (StatusCode, Json<ErrorResponse>)> {
    match wallet::store::find(&state.pool, user_id).await {
        Ok(Some(wallet)) => Ok(Json(wallet)),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Wallet not found")),
        Err(e) => {
            tracing::error!("Failed to load wallet {user_id}: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// Get recent ledger rows for a user, newest first.
pub async fn get_entries(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<EntriesQuery>,
) -> Result<Json<Vec<LedgerEntry>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = query.limit.clamp(1, 500);
    match wallet::store::entries(&state.pool, user_id, limit).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            tracing::error!("Failed to load ledger entries for {user_id}: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BetDetail {
    pub bet: Bet,
    /// Win/cancel leg pointing back at this bet, if one has settled it
    pub settlement_leg: Option<Bet>,
}

/// Inspect a bet and the settlement leg referencing it.
pub async fn get_bet(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<BetDetail>, (StatusCode, Json<ErrorResponse>)> {
    let bet = match bets::registry::find_by_transaction_id(&state.pool, &transaction_id).await {
        Ok(Some(bet)) => bet,
        Ok(None) => return Err(error_response(StatusCode::NOT_FOUND, "Bet not found")),
        Err(e) => {
            tracing::error!("Failed to load bet {transaction_id}: {e}");
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ));
        }
    };

    let settlement_leg = bets::registry::find_by_ref_id(&state.pool, &bet.transaction_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load settlement leg for {transaction_id}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    Ok(Json(BetDetail {
        bet,
        settlement_leg,
    }))
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Caller's balance after the movement
    pub balance: i64,
}

/// Move credits from the caller's wallet to another user's wallet.
pub async fn transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, (StatusCode, Json<ErrorResponse>)> {
    let caller = caller_from_headers(&headers)?;

    match state.engine.transfer(&caller, &request).await {
        Ok(balance) => {
            metrics::operator_calls_total("transfer", 200);
            Ok(Json(TransferResponse { balance }))
        }
        Err(err) => {
            let status = match &err {
                SettlementError::Forbidden => StatusCode::FORBIDDEN,
                SettlementError::NoUser => StatusCode::NOT_FOUND,
                SettlementError::Validation(_) => StatusCode::BAD_REQUEST,
                SettlementError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            metrics::operator_calls_total("transfer", status.as_u16());
            Err(error_response(status, err.client_message()))
        }
    }
}
