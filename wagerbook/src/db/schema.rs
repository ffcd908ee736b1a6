//! Schema bootstrap for the settlement core tables.
//!
//! The server and the integration tests call [`apply`] on startup so a fresh
//! database provisions itself. Every statement is idempotent; running the
//! bootstrap against an already-provisioned database is a no-op.
//!
//! The `bets.transaction_id` unique constraint is load-bearing: it is the
//! storage-layer guarantee that resolves races between concurrent inserts of
//! the same provider transaction id.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS wallets (
        user_id     BIGINT PRIMARY KEY,
        balance     BIGINT NOT NULL DEFAULT 0,
        currency    TEXT NOT NULL DEFAULT 'USD',
        created_at  TIMESTAMP NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMP NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bets (
        id              BIGSERIAL PRIMARY KEY,
        user_id         BIGINT NOT NULL,
        transaction_id  TEXT NOT NULL,
        ref_id          TEXT,
        game_reference  TEXT NOT NULL DEFAULT '',
        amount          BIGINT NOT NULL DEFAULT 0,
        win_amount      BIGINT NOT NULL DEFAULT 0,
        status          TEXT NOT NULL DEFAULT 'unsettled',
        created_at      TIMESTAMP NOT NULL DEFAULT NOW(),
        CONSTRAINT bets_transaction_id_key UNIQUE (transaction_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS bets_user_id_idx ON bets (user_id)",
    "CREATE INDEX IF NOT EXISTS bets_ref_id_idx ON bets (ref_id)",
    r#"
    CREATE TABLE IF NOT EXISTS wallet_transactions (
        id                BIGSERIAL PRIMARY KEY,
        wallet_id         BIGINT NOT NULL,
        receiver_user_id  BIGINT,
        sender_user_id    BIGINT,
        operator_id       BIGINT,
        amount            BIGINT NOT NULL,
        currency          TEXT NOT NULL DEFAULT 'USD',
        status            TEXT NOT NULL DEFAULT 'approved',
        hash              TEXT NOT NULL,
        type              TEXT NOT NULL,
        accepted          BOOLEAN NOT NULL DEFAULT TRUE,
        meta              JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at        TIMESTAMP NOT NULL DEFAULT NOW(),
        CONSTRAINT wallet_transactions_hash_key UNIQUE (hash)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS wallet_transactions_wallet_id_idx ON wallet_transactions (wallet_id)",
];

// Session-level advisory lock key serializing concurrent bootstrap attempts
// (several server processes or test binaries may start against one database).
const BOOTSTRAP_LOCK_KEY: i64 = 0x7761_6765_7262;

/// Create the core tables and indexes if they do not exist yet.
pub async fn apply(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(BOOTSTRAP_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    let mut result = Ok(());
    for statement in STATEMENTS {
        if let Err(e) = sqlx::query(statement).execute(&mut *conn).await {
            result = Err(e);
            break;
        }
    }

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(BOOTSTRAP_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    if result.is_ok() {
        log::debug!("schema bootstrap applied ({} statements)", STATEMENTS.len());
    }
    result
}
