//! Ledger store implementation.
//!
//! Reads run against the pool; mutations run inside a caller-owned SQL
//! transaction so the settlement engine can span the wallet and the bet
//! registry with one atomic unit. `find_for_update` takes the exclusive row
//! lock that serializes all writers of a wallet.

use super::{
    errors::{WalletError, WalletResult},
    models::{LedgerDescriptor, LedgerEntry, TransactionKind, Wallet, ledger_hash},
};
use sqlx::{PgPool, Postgres, Row, Transaction};

fn wallet_from_row(row: &sqlx::postgres::PgRow) -> Wallet {
    Wallet {
        user_id: row.get("user_id"),
        balance: row.get("balance"),
        currency: row.get("currency"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    }
}

/// Get the wallet for a user, if one exists.
pub async fn find(pool: &PgPool, user_id: i64) -> WalletResult<Option<Wallet>> {
    let row = sqlx::query(
        r#"
        SELECT user_id, balance, currency, created_at, updated_at
        FROM wallets
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(wallet_from_row))
}

/// Get the wallet for a user inside a transaction, taking an exclusive row
/// lock. Concurrent settlement calls against the same wallet serialize here.
pub async fn find_for_update(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
) -> WalletResult<Option<Wallet>> {
    let row = sqlx::query(
        r#"
        SELECT user_id, balance, currency, created_at, updated_at
        FROM wallets
        WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.as_ref().map(wallet_from_row))
}

/// Provision a wallet for a user (account-creation collaborator).
///
/// # Errors
///
/// * `WalletError::WalletExists` - A wallet already exists for this user
/// * `WalletError::InvalidAmount` - Negative opening balance
pub async fn create(
    pool: &PgPool,
    user_id: i64,
    opening_balance: i64,
    currency: &str,
) -> WalletResult<Wallet> {
    if opening_balance < 0 {
        return Err(WalletError::InvalidAmount(opening_balance));
    }

    let row = sqlx::query(
        r#"
        INSERT INTO wallets (user_id, balance, currency)
        VALUES ($1, $2, $3)
        RETURNING user_id, balance, currency, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(opening_balance)
    .bind(currency)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                return WalletError::WalletExists(user_id);
            }
        }
        WalletError::Database(e)
    })?;

    Ok(wallet_from_row(&row))
}

/// True iff the wallet balance covers `amount`.
pub async fn can_withdraw(pool: &PgPool, user_id: i64, amount: i64) -> WalletResult<bool> {
    let balance: i64 = sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(WalletError::WalletNotFound(user_id))?;

    Ok(balance >= amount)
}

/// Apply a signed delta to a wallet balance and append the matching ledger
/// row, inside the caller's transaction.
///
/// Re-acquires the row lock (a no-op when the caller already holds it via
/// [`find_for_update`]), applies the delta with overflow checks, and inserts
/// one `wallet_transactions` row with a freshly generated hash. Returns the
/// new balance.
pub async fn adjust_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    delta: i64,
    descriptor: &LedgerDescriptor,
    currency: &str,
) -> WalletResult<i64> {
    let current: i64 = sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(WalletError::WalletNotFound(user_id))?;

    let new_balance = current.checked_add(delta).ok_or(WalletError::BalanceOverflow)?;

    sqlx::query("UPDATE wallets SET balance = $1, updated_at = NOW() WHERE user_id = $2")
        .bind(new_balance)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    let kind = if delta < 0 {
        TransactionKind::Withdraw
    } else {
        TransactionKind::Deposit
    };

    sqlx::query(
        r#"
        INSERT INTO wallet_transactions
            (wallet_id, receiver_user_id, sender_user_id, operator_id, amount, currency, status, hash, type, accepted, meta)
        VALUES ($1, $2, $3, $4, $5, $6, 'approved', $7, $8, TRUE, $9)
        "#,
    )
    .bind(user_id)
    .bind(descriptor.receiver_user_id)
    .bind(descriptor.sender_user_id)
    .bind(descriptor.operator_id)
    .bind(delta.abs())
    .bind(currency)
    .bind(ledger_hash(user_id, delta))
    .bind(kind.to_string())
    .bind(&descriptor.meta)
    .execute(&mut **tx)
    .await?;

    Ok(new_balance)
}

/// Get recent ledger rows for a user, newest first.
pub async fn entries(pool: &PgPool, user_id: i64, limit: i64) -> WalletResult<Vec<LedgerEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, wallet_id, receiver_user_id, sender_user_id, operator_id,
               amount, currency, status, hash, type, accepted, meta, created_at
        FROM wallet_transactions
        WHERE wallet_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let entries = rows
        .into_iter()
        .map(|row| LedgerEntry {
            id: row.get("id"),
            wallet_id: row.get("wallet_id"),
            receiver_user_id: row.get("receiver_user_id"),
            sender_user_id: row.get("sender_user_id"),
            operator_id: row.get("operator_id"),
            amount: row.get("amount"),
            currency: row.get("currency"),
            status: row.get("status"),
            hash: row.get("hash"),
            kind: match row.get::<String, _>("type").as_str() {
                "withdraw" => TransactionKind::Withdraw,
                _ => TransactionKind::Deposit,
            },
            accepted: row.get("accepted"),
            meta: row.get("meta"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        })
        .collect();

    Ok(entries)
}
