//! Canonical game-provider callback handlers.
//!
//! Providers call back with an already-authenticated player identity in the
//! payload (the upstream gateway owns token checks and per-vendor wire
//! formats). Every handler answers HTTP 200 with the canonical result body:
//! providers branch on `ok`/`error_code`/`already_processed`, not on the
//! status line. Replays are success outcomes carrying the current balance.

use axum::{Json, extract::State};
use serde::Deserialize;
use std::time::Instant;
use wagerbook::settlement::{
    AbortRequest, Caller, CreditRequest, DebitRequest, PlayerIdentity, SettlementOutcome,
    SettlementResponse, SettlementResult,
};

use super::AppState;
use crate::{logging, metrics};

/// Player identity as supplied by the upstream gateway.
#[derive(Debug, Deserialize)]
pub struct CallbackUser {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl From<CallbackUser> for Caller {
    fn from(user: CallbackUser) -> Self {
        Caller::player(PlayerIdentity {
            user_id: user.user_id,
            username: user.username,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BalanceCallback {
    pub user: CallbackUser,
}

#[derive(Debug, Deserialize)]
pub struct BetCallback {
    pub transaction_id: String,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub game_reference: String,
    pub amount: i64,
    pub user: CallbackUser,
}

#[derive(Debug, Deserialize)]
pub struct WinCallback {
    pub transaction_id: String,
    pub ref_id: String,
    #[serde(default)]
    pub game_reference: String,
    pub amount: i64,
    pub user: CallbackUser,
}

#[derive(Debug, Deserialize)]
pub struct RefundCallback {
    pub transaction_id: String,
    pub amount: i64,
}

fn outcome_label(result: &SettlementResult<SettlementOutcome>) -> &'static str {
    match result {
        Ok(outcome) if outcome.already_processed => "replayed",
        Ok(_) => "applied",
        Err(err) => err.code(),
    }
}

fn respond(
    operation: &'static str,
    started: Instant,
    result: SettlementResult<SettlementOutcome>,
) -> Json<SettlementResponse> {
    let duration_ms = started.elapsed().as_millis() as u64;
    let outcome = outcome_label(&result);
    metrics::settlement_calls_total(operation, outcome);
    metrics::settlement_call_duration_ms(operation, duration_ms as f64);
    logging::log_settlement_call(operation, outcome, duration_ms);

    Json(SettlementResponse::from_result(result))
}

/// Player balance lookup.
pub async fn balance(
    State(state): State<AppState>,
    Json(callback): Json<BalanceCallback>,
) -> Json<SettlementResponse> {
    let started = Instant::now();
    let caller: Caller = callback.user.into();
    let result = state
        .engine
        .balance(&caller)
        .await
        .map(SettlementOutcome::applied);
    respond("balance", started, result)
}

/// Place a stake (debit callback).
pub async fn bet(
    State(state): State<AppState>,
    Json(callback): Json<BetCallback>,
) -> Json<SettlementResponse> {
    let started = Instant::now();
    let caller: Caller = callback.user.into();
    let request = DebitRequest {
        transaction_id: callback.transaction_id,
        ref_id: callback.ref_id,
        game_reference: callback.game_reference,
        amount: callback.amount,
    };
    let result = state.engine.debit(&caller, &request).await;
    respond("debit", started, result)
}

/// Settle a win (credit callback).
pub async fn win(
    State(state): State<AppState>,
    Json(callback): Json<WinCallback>,
) -> Json<SettlementResponse> {
    let started = Instant::now();
    let caller: Caller = callback.user.into();
    let request = CreditRequest {
        transaction_id: callback.transaction_id,
        ref_id: callback.ref_id,
        game_reference: callback.game_reference,
        amount: callback.amount,
    };
    let result = state.engine.credit(&caller, &request).await;
    respond("credit", started, result)
}

/// Cancel/refund a transaction (abort callback).
pub async fn refund(
    State(state): State<AppState>,
    Json(callback): Json<RefundCallback>,
) -> Json<SettlementResponse> {
    let started = Instant::now();
    let request = AbortRequest {
        transaction_id: callback.transaction_id,
        amount: callback.amount,
    };
    let result = state.engine.abort(&request).await;
    respond("abort", started, result)
}
