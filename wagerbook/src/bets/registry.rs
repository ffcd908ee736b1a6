//! Bet registry implementation.
//!
//! Lookups are offered both pool-side (adapter reads) and transaction-side
//! (settlement atomic units). Inserts map the unique-constraint violation on
//! `transaction_id` to [`BetError::DuplicateTransaction`], which is the
//! race-safe duplicate detection the idempotency layer relies on.

use super::{
    errors::{BetError, BetResult},
    models::{Bet, BetStatus, NewBet},
};
use sqlx::{PgPool, Postgres, Row, Transaction};

const BET_COLUMNS: &str =
    "id, user_id, transaction_id, ref_id, game_reference, amount, win_amount, status, created_at";

fn bet_from_row(row: &sqlx::postgres::PgRow) -> Bet {
    Bet {
        id: row.get("id"),
        user_id: row.get("user_id"),
        transaction_id: row.get("transaction_id"),
        ref_id: row.get("ref_id"),
        game_reference: row.get("game_reference"),
        amount: row.get("amount"),
        win_amount: row.get("win_amount"),
        status: BetStatus::parse(&row.get::<String, _>("status")).unwrap_or(BetStatus::Unsettled),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

/// Find a bet by its provider transaction id.
pub async fn find_by_transaction_id(pool: &PgPool, transaction_id: &str) -> BetResult<Option<Bet>> {
    let row = sqlx::query(&format!(
        "SELECT {BET_COLUMNS} FROM bets WHERE transaction_id = $1"
    ))
    .bind(transaction_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(bet_from_row))
}

/// Transaction-side lookup by transaction id.
///
/// Runs inside the caller's atomic unit so the result reflects rows committed
/// before the caller acquired its wallet lock.
pub async fn find_by_transaction_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    transaction_id: &str,
) -> BetResult<Option<Bet>> {
    let row = sqlx::query(&format!(
        "SELECT {BET_COLUMNS} FROM bets WHERE transaction_id = $1"
    ))
    .bind(transaction_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.as_ref().map(bet_from_row))
}

/// Find the bet whose `ref_id` points at the given transaction id, i.e. the
/// win/cancel leg of an originating debit.
pub async fn find_by_ref_id(pool: &PgPool, ref_id: &str) -> BetResult<Option<Bet>> {
    let row = sqlx::query(&format!(
        "SELECT {BET_COLUMNS} FROM bets WHERE ref_id = $1 ORDER BY id LIMIT 1"
    ))
    .bind(ref_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(bet_from_row))
}

/// Insert a new bet row inside the caller's transaction.
///
/// # Errors
///
/// * `BetError::DuplicateTransaction` - `transaction_id` already exists;
///   raised by the storage layer's unique constraint, so two concurrent
///   inserts of the same id can never both commit.
pub async fn create(tx: &mut Transaction<'_, Postgres>, bet: &NewBet) -> BetResult<Bet> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO bets (user_id, transaction_id, ref_id, game_reference, amount, win_amount, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {BET_COLUMNS}
        "#
    ))
    .bind(bet.user_id)
    .bind(&bet.transaction_id)
    .bind(&bet.ref_id)
    .bind(&bet.game_reference)
    .bind(bet.amount)
    .bind(bet.win_amount)
    .bind(bet.status.as_str())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                return BetError::DuplicateTransaction(bet.transaction_id.clone());
            }
        }
        BetError::Database(e)
    })?;

    Ok(bet_from_row(&row))
}

/// Move a bet to a new lifecycle status inside the caller's transaction.
///
/// # Errors
///
/// * `BetError::IllegalTransition` - the lifecycle does not permit the change
pub async fn transition(
    tx: &mut Transaction<'_, Postgres>,
    bet: &Bet,
    next: BetStatus,
) -> BetResult<Bet> {
    if !bet.status.can_transition_to(next) {
        return Err(BetError::IllegalTransition {
            from: bet.status,
            to: next,
        });
    }

    let row = sqlx::query(&format!(
        "UPDATE bets SET status = $1 WHERE id = $2 RETURNING {BET_COLUMNS}"
    ))
    .bind(next.as_str())
    .bind(bet.id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(bet_from_row(&row))
}
