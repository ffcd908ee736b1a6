//! Settlement engine implementation.
//!
//! Every mutating operation is one SQL transaction: wallet row locked
//! `FOR UPDATE`, registry lookup, registry write, balance adjustment,
//! commit. Any error before the commit drops the transaction and rolls the
//! whole unit back, so provider retries never accumulate partial state.
//!
//! Lock order is wallet-then-bet everywhere. Concurrent calls against the
//! same wallet (including duplicate retries of one transaction id)
//! serialize on the wallet lock; same-id inserts that race from different
//! wallets are resolved by the `bets.transaction_id` unique constraint.

use super::{
    errors::{SettlementError, SettlementResult},
    models::{
        AbortRequest, Caller, CallerRole, CreditRequest, DebitRequest, SettlementOutcome,
        TransferRequest,
    },
};
use crate::bets::{self, BetStatus, NewBet};
use crate::wallet::{self, LedgerDescriptor};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

/// Settlement engine
#[derive(Clone)]
pub struct SettlementEngine {
    pool: Arc<PgPool>,
    currency: String,
    operator_id: Option<i64>,
}

impl SettlementEngine {
    /// Create a new settlement engine.
    ///
    /// Reads `DEFAULT_CURRENCY` (default `USD`) and `OPERATOR_ID` from the
    /// environment; the operator id is stamped on every ledger row the
    /// engine appends.
    pub fn new(pool: Arc<PgPool>) -> Self {
        let currency = std::env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "USD".to_string());
        let operator_id = std::env::var("OPERATOR_ID")
            .ok()
            .and_then(|v| v.parse().ok());

        Self {
            pool,
            currency,
            operator_id,
        }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Current balance for the caller's wallet, in minor units.
    pub async fn balance(&self, caller: &Caller) -> SettlementResult<i64> {
        let identity = caller.require_identity()?;
        let wallet = wallet::store::find(&self.pool, identity.user_id)
            .await?
            .ok_or(SettlementError::NoUser)?;
        Ok(wallet.balance)
    }

    /// Place a stake: create the unsettled bet and decrement the balance.
    ///
    /// A transaction id that already exists is a provider retry; it is
    /// answered deterministically with the current balance and the
    /// already-processed flag, never by recomputing the delta. The
    /// insufficient-funds check runs under the wallet lock, before any
    /// write.
    pub async fn debit(
        &self,
        caller: &Caller,
        req: &DebitRequest,
    ) -> SettlementResult<SettlementOutcome> {
        req.validate()?;
        let identity = caller.require_identity()?;

        let mut tx = self.pool.begin().await?;

        let wallet = wallet::store::find_for_update(&mut tx, identity.user_id)
            .await?
            .ok_or(SettlementError::NoUser)?;

        if bets::registry::find_by_transaction_id_tx(&mut tx, &req.transaction_id)
            .await?
            .is_some()
        {
            log::debug!(
                "debit replay for transaction {} on user {}",
                req.transaction_id,
                identity.user_id
            );
            return Ok(SettlementOutcome::replayed(wallet.balance));
        }

        if wallet.balance < req.amount {
            return Err(SettlementError::InsufficientFunds {
                available: wallet.balance,
                required: req.amount,
            });
        }

        let bet = NewBet::stake(
            identity.user_id,
            req.transaction_id.clone(),
            req.ref_id.clone(),
            req.game_reference.clone(),
            req.amount,
        );
        bets::registry::create(&mut tx, &bet).await?;

        let descriptor = LedgerDescriptor::settlement(
            identity.user_id,
            self.operator_id,
            json!({
                "op": "debit",
                "transaction_id": req.transaction_id,
                "game_reference": req.game_reference,
            }),
        );
        let new_balance = wallet::store::adjust_balance(
            &mut tx,
            identity.user_id,
            -req.amount,
            &descriptor,
            &self.currency,
        )
        .await?;

        tx.commit().await?;

        log::info!(
            "debit {} applied for user {}: stake {}, balance {}",
            req.transaction_id,
            identity.user_id,
            req.amount,
            new_balance
        );
        Ok(SettlementOutcome::applied(new_balance))
    }

    /// Settle a win: create the win leg, move the originating bet to `Won`,
    /// and increment the balance.
    pub async fn credit(
        &self,
        caller: &Caller,
        req: &CreditRequest,
    ) -> SettlementResult<SettlementOutcome> {
        req.validate()?;
        let identity = caller.require_identity()?;

        let mut tx = self.pool.begin().await?;

        let wallet = wallet::store::find_for_update(&mut tx, identity.user_id)
            .await?
            .ok_or(SettlementError::NoUser)?;

        let origin = bets::registry::find_by_transaction_id_tx(&mut tx, &req.ref_id)
            .await?
            .ok_or_else(|| SettlementError::BetNotFound(req.ref_id.clone()))?;

        if bets::registry::find_by_transaction_id_tx(&mut tx, &req.transaction_id)
            .await?
            .is_some()
        {
            return Err(SettlementError::AlreadySettled {
                balance: wallet.balance,
            });
        }

        let leg = NewBet::win_leg(
            identity.user_id,
            req.transaction_id.clone(),
            req.ref_id.clone(),
            req.game_reference.clone(),
            req.amount,
        );
        bets::registry::create(&mut tx, &leg).await?;
        bets::registry::transition(&mut tx, &origin, BetStatus::Won).await?;

        let descriptor = LedgerDescriptor::settlement(
            identity.user_id,
            self.operator_id,
            json!({
                "op": "credit",
                "transaction_id": req.transaction_id,
                "ref_id": req.ref_id,
                "game_reference": req.game_reference,
            }),
        );
        let new_balance = wallet::store::adjust_balance(
            &mut tx,
            identity.user_id,
            req.amount,
            &descriptor,
            &self.currency,
        )
        .await?;

        tx.commit().await?;

        log::info!(
            "credit {} applied for user {}: win {}, balance {}",
            req.transaction_id,
            identity.user_id,
            req.amount,
            new_balance
        );
        Ok(SettlementOutcome::applied(new_balance))
    }

    /// Cancel/refund the bet carrying this transaction id.
    ///
    /// Unsettled bets get the amount credited back. Won bets with a non-zero
    /// stake also credit back; a zero stake marks a win leg, whose abort
    /// claws the amount out of the wallet instead (observed provider
    /// behavior, kept as-is). Lost and refunded bets answer `AlreadySettled`.
    pub async fn abort(&self, req: &AbortRequest) -> SettlementResult<SettlementOutcome> {
        req.validate()?;

        let mut tx = self.pool.begin().await?;

        let probe = bets::registry::find_by_transaction_id_tx(&mut tx, &req.transaction_id)
            .await?
            .ok_or_else(|| SettlementError::BetNotFound(req.transaction_id.clone()))?;

        let wallet = wallet::store::find_for_update(&mut tx, probe.user_id)
            .await?
            .ok_or(SettlementError::NoUser)?;

        // Re-read under the wallet lock; a concurrent settle or abort may
        // have committed between the probe and the lock.
        let bet = bets::registry::find_by_transaction_id_tx(&mut tx, &req.transaction_id)
            .await?
            .ok_or_else(|| SettlementError::BetNotFound(req.transaction_id.clone()))?;

        let delta = match bet.status {
            BetStatus::Unsettled => req.amount,
            BetStatus::Won => {
                if bet.amount != 0 {
                    req.amount
                } else {
                    -req.amount
                }
            }
            BetStatus::Lost | BetStatus::Refunded => {
                return Err(SettlementError::AlreadySettled {
                    balance: wallet.balance,
                });
            }
        };

        bets::registry::transition(&mut tx, &bet, BetStatus::Refunded).await?;

        let descriptor = LedgerDescriptor::settlement(
            bet.user_id,
            self.operator_id,
            json!({
                "op": "abort",
                "transaction_id": req.transaction_id,
                "game_reference": bet.game_reference,
            }),
        );
        let new_balance =
            wallet::store::adjust_balance(&mut tx, bet.user_id, delta, &descriptor, &self.currency)
                .await?;

        tx.commit().await?;

        log::info!(
            "abort {} applied for user {}: delta {}, balance {}",
            req.transaction_id,
            bet.user_id,
            delta,
            new_balance
        );
        Ok(SettlementOutcome::applied(new_balance))
    }

    /// Move credits from the caller's wallet to another user's wallet.
    ///
    /// Requires a manager or administrator role. An administrator mints
    /// credits (the receiver is deposited without debiting the caller); a
    /// manager's own wallet must cover the amount and is debited. Returns
    /// the caller's balance after the movement.
    pub async fn transfer(
        &self,
        caller: &Caller,
        req: &TransferRequest,
    ) -> SettlementResult<i64> {
        req.validate()?;
        if !caller.role.can_move_funds() {
            return Err(SettlementError::Forbidden);
        }
        let identity = caller.require_identity()?;
        if identity.user_id == req.to_user {
            return Err(SettlementError::Validation(
                "cannot transfer to the sending wallet".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // Wallet locks always in ascending user id order.
        let (first, second) = if identity.user_id < req.to_user {
            (identity.user_id, req.to_user)
        } else {
            (req.to_user, identity.user_id)
        };
        let w1 = wallet::store::find_for_update(&mut tx, first)
            .await?
            .ok_or(SettlementError::NoUser)?;
        let w2 = wallet::store::find_for_update(&mut tx, second)
            .await?
            .ok_or(SettlementError::NoUser)?;
        let (sender, _receiver) = if first == identity.user_id {
            (w1, w2)
        } else {
            (w2, w1)
        };

        let meta = json!({ "op": "transfer" });
        let sender_balance = match caller.role {
            CallerRole::Administrator => sender.balance,
            _ => {
                if sender.balance < req.amount {
                    return Err(SettlementError::InsufficientFunds {
                        available: sender.balance,
                        required: req.amount,
                    });
                }
                let descriptor = LedgerDescriptor {
                    receiver_user_id: Some(req.to_user),
                    sender_user_id: Some(identity.user_id),
                    operator_id: Some(identity.user_id),
                    meta: meta.clone(),
                };
                wallet::store::adjust_balance(
                    &mut tx,
                    identity.user_id,
                    -req.amount,
                    &descriptor,
                    &self.currency,
                )
                .await?
            }
        };

        let descriptor = LedgerDescriptor {
            receiver_user_id: Some(req.to_user),
            sender_user_id: Some(identity.user_id),
            operator_id: Some(identity.user_id),
            meta,
        };
        wallet::store::adjust_balance(&mut tx, req.to_user, req.amount, &descriptor, &self.currency)
            .await?;

        tx.commit().await?;

        log::info!(
            "transfer applied: {} -> {} amount {}",
            identity.user_id,
            req.to_user,
            req.amount
        );
        Ok(sender_balance)
    }
}
