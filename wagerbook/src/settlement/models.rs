//! Canonical settlement request, caller, and result types.
//!
//! These are the shapes provider adapters translate their wire formats into
//! and out of. Validation happens here, before any storage is touched.

use super::errors::{SettlementError, SettlementResult};
use serde::{Deserialize, Serialize};

/// Authenticated player identity, resolved by the adapter layer before the
/// engine is called. The engine never consults ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl PlayerIdentity {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            username: None,
        }
    }
}

/// Capability role precomputed by the adapter/authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Player,
    Manager,
    Administrator,
}

impl CallerRole {
    pub fn can_move_funds(self) -> bool {
        matches!(self, CallerRole::Manager | CallerRole::Administrator)
    }
}

/// Explicit caller argument for every settlement call: who, with what role.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Option<PlayerIdentity>,
    pub role: CallerRole,
}

impl Caller {
    pub fn player(identity: PlayerIdentity) -> Self {
        Self {
            identity: Some(identity),
            role: CallerRole::Player,
        }
    }

    pub fn with_role(identity: PlayerIdentity, role: CallerRole) -> Self {
        Self {
            identity: Some(identity),
            role,
        }
    }

    /// The player identity, or `NoUser` when the adapter supplied none.
    pub fn require_identity(&self) -> SettlementResult<&PlayerIdentity> {
        self.identity.as_ref().ok_or(SettlementError::NoUser)
    }
}

/// Stake placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebitRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub game_reference: String,
    pub amount: i64,
}

impl DebitRequest {
    pub fn validate(&self) -> SettlementResult<()> {
        validate_transaction_id(&self.transaction_id)?;
        validate_amount(self.amount)
    }
}

/// Win settlement request; `ref_id` links back to the originating debit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRequest {
    pub transaction_id: String,
    pub ref_id: String,
    #[serde(default)]
    pub game_reference: String,
    pub amount: i64,
}

impl CreditRequest {
    pub fn validate(&self) -> SettlementResult<()> {
        validate_transaction_id(&self.transaction_id)?;
        if self.ref_id.is_empty() {
            return Err(SettlementError::Validation(
                "ref_id must not be empty".to_string(),
            ));
        }
        validate_amount(self.amount)
    }
}

/// Cancel/refund request, looked up by the transaction id being aborted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbortRequest {
    pub transaction_id: String,
    pub amount: i64,
}

impl AbortRequest {
    pub fn validate(&self) -> SettlementResult<()> {
        validate_transaction_id(&self.transaction_id)?;
        validate_amount(self.amount)
    }
}

/// Operator fund movement from the caller's wallet to another user's wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub to_user: i64,
    pub amount: i64,
}

impl TransferRequest {
    pub fn validate(&self) -> SettlementResult<()> {
        if self.amount <= 0 {
            return Err(SettlementError::Validation(format!(
                "transfer amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

fn validate_transaction_id(transaction_id: &str) -> SettlementResult<()> {
    if transaction_id.is_empty() {
        return Err(SettlementError::Validation(
            "transaction_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_amount(amount: i64) -> SettlementResult<()> {
    if amount < 0 {
        return Err(SettlementError::Validation(format!(
            "amount must not be negative, got {amount}"
        )));
    }
    Ok(())
}

/// Outcome of a successful settlement call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SettlementOutcome {
    /// Current balance in minor units after (or, on replay, unchanged by)
    /// the call
    pub balance: i64,
    /// True when the transaction id had already been processed and the
    /// stored outcome was replayed instead of recomputing the delta
    pub already_processed: bool,
}

impl SettlementOutcome {
    pub fn applied(balance: i64) -> Self {
        Self {
            balance,
            already_processed: false,
        }
    }

    pub fn replayed(balance: i64) -> Self {
        Self {
            balance,
            already_processed: true,
        }
    }
}

/// Canonical wire result handed back to provider adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub ok: bool,
    pub balance: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_processed: Option<bool>,
}

impl SettlementResponse {
    /// Map an engine result to the canonical wire shape.
    ///
    /// "Already processed" is a success outcome for adapters: replays and
    /// `AlreadySettled` both answer `ok` with the current balance and the
    /// already-processed flag, never an error.
    pub fn from_result(result: SettlementResult<SettlementOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                ok: true,
                balance: outcome.balance,
                error_code: None,
                error_message: None,
                already_processed: outcome.already_processed.then_some(true),
            },
            Err(SettlementError::AlreadySettled { balance }) => Self {
                ok: true,
                balance,
                error_code: None,
                error_message: None,
                already_processed: Some(true),
            },
            Err(err) => Self {
                ok: false,
                balance: match &err {
                    SettlementError::InsufficientFunds { available, .. } => *available,
                    _ => 0,
                },
                error_code: Some(err.code().to_string()),
                error_message: Some(err.client_message()),
                already_processed: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_request_validation() {
        let mut req = DebitRequest {
            transaction_id: "t1".into(),
            ref_id: None,
            game_reference: String::new(),
            amount: 100,
        };
        assert!(req.validate().is_ok());

        req.amount = -1;
        assert!(matches!(
            req.validate(),
            Err(SettlementError::Validation(_))
        ));

        req.amount = 0;
        assert!(req.validate().is_ok(), "zero-stake bets are accepted");

        req.transaction_id = String::new();
        assert!(matches!(
            req.validate(),
            Err(SettlementError::Validation(_))
        ));
    }

    #[test]
    fn test_credit_request_requires_ref_id() {
        let req = CreditRequest {
            transaction_id: "t2".into(),
            ref_id: String::new(),
            game_reference: String::new(),
            amount: 100,
        };
        assert!(matches!(
            req.validate(),
            Err(SettlementError::Validation(_))
        ));
    }

    #[test]
    fn test_already_settled_renders_as_success() {
        let response =
            SettlementResponse::from_result(Err(SettlementError::AlreadySettled { balance: 800 }));
        assert!(response.ok);
        assert_eq!(response.balance, 800);
        assert_eq!(response.already_processed, Some(true));
        assert!(response.error_code.is_none());
    }

    #[test]
    fn test_domain_error_renders_with_codes() {
        let response = SettlementResponse::from_result(Err(SettlementError::InsufficientFunds {
            available: 50,
            required: 200,
        }));
        assert!(!response.ok);
        assert_eq!(response.balance, 50);
        assert_eq!(response.error_code.as_deref(), Some("insufficient_funds"));
    }

    #[test]
    fn test_replay_outcome_sets_flag() {
        let response = SettlementResponse::from_result(Ok(SettlementOutcome::replayed(900)));
        assert!(response.ok);
        assert_eq!(response.already_processed, Some(true));

        let response = SettlementResponse::from_result(Ok(SettlementOutcome::applied(900)));
        assert!(response.already_processed.is_none());
    }
}
