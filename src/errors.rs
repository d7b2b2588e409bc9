//! Error types for the betledger engine
//!
//! One taxonomy for every engine operation. Validation always happens
//! before any wallet mutation, so a returned error implies no partial
//! effect on the ledger.

use rust_decimal::Decimal;

/// Root error type for all engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed or out-of-range input, caller's fault
    #[error("validation failed: {0}")]
    Validation(String),

    /// Amount failed to parse or was not strictly positive
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Bet number outside the range mandated by the bet type
    #[error("number {number} out of range for {bet_type} bets ({min}-{max})")]
    InvalidNumberRange {
        bet_type: &'static str,
        number: i32,
        min: i32,
        max: i32,
    },

    /// Business-rule rejection, wallet left untouched
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// A request already left the pending state
    #[error("already processed: {0}")]
    AlreadyProcessed(String),

    /// Unknown request, bet or user id
    #[error("not found: {0}")]
    NotFound(String),

    /// A referenced entity (referrer, request target) could not be resolved
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// Storage or invariant failure; surfaced without internals
    #[error("internal failure: {0}")]
    Internal(String),
}

/// Convenience type alias for engine results
pub type EngineResult<T> = Result<T, EngineError>;
