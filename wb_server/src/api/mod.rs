//! HTTP API for the settlement server.
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower-http**: CORS middleware
//!
//! # Modules
//!
//! - [`provider`]: canonical game-provider callbacks (balance, bet, win,
//!   refund). Every response is HTTP 200 with the canonical result body;
//!   providers read the `ok`/`error_code` fields, not the status line.
//! - [`operator`]: operator-platform endpoints (wallet provisioning and
//!   reads, bet inspection, manager fund movement). These use conventional
//!   REST status codes.
//!
//! Caller authentication lives upstream in the operator platform's gateway;
//! requests arrive here with a resolved identity in the payload (provider
//! callbacks) or in trusted headers (operator endpoints).
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                                  - Health check
//! POST /api/v1/provider/balance                 - Player balance
//! POST /api/v1/provider/bet                     - Place stake (debit)
//! POST /api/v1/provider/win                     - Settle win (credit)
//! POST /api/v1/provider/refund                  - Cancel/refund (abort)
//! POST /api/v1/wallets                          - Provision wallet
//! GET  /api/v1/wallets/{user_id}                - Wallet state
//! GET  /api/v1/wallets/{user_id}/entries        - Ledger rows
//! GET  /api/v1/bets/{transaction_id}            - Bet + settlement leg
//! POST /api/v1/transfers                        - Manager fund movement
//! ```

pub mod operator;
pub mod provider;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use wagerbook::settlement::SettlementEngine;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SettlementEngine>,
    pub pool: Arc<PgPool>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes, versioned for future evolution.
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/provider/balance", post(provider::balance))
        .route("/provider/bet", post(provider::bet))
        .route("/provider/win", post(provider::win))
        .route("/provider/refund", post(provider::refund))
        .route("/wallets", post(operator::create_wallet))
        .route("/wallets/{user_id}", get(operator::get_wallet))
        .route("/wallets/{user_id}/entries", get(operator::get_entries))
        .route("/bets/{transaction_id}", get(operator::get_bet))
        .route("/transfers", post(operator::transfer))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers, `503` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
