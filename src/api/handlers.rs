//! Request Handlers
//!
//! User-facing handlers. Identity arrives in the `x-user-id` header
//! from the upstream gateway; the engine itself stays protocol-agnostic.

use super::{
    errors::ApiError,
    middleware::{require_user, RequestId},
    models::*,
};
use crate::engine::Engine;
use crate::referral::ReferralEarnings;
use crate::requests::Transaction;
use axum::{extract::State, http::HeaderMap, Extension, Json};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub engine: Arc<Engine>,
    /// Operator key for admin routes; `None` leaves them open (dev mode)
    pub admin_key: Option<String>,
}

/// Health check handler - minimal response time
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// Register a new user
/// POST /register
pub async fn register_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let user = state
        .engine
        .register_user(&body.username, &body.mobile, body.referral_code.as_deref())
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(RegisterResponse {
        user_id: user.id,
        referral_code: user.referral_code,
    }))
}

/// Wallet pools for the calling user
/// GET /balance
pub async fn balance_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let wallet = state
        .engine
        .wallet_balance(user_id)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(BalanceResponse {
        balance: money(wallet.balance),
        bonus: money(wallet.bonus),
        winnings: money(wallet.winnings),
    }))
}

/// Place a bet
/// POST /place-bet
pub async fn place_bet_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlaceBetRequest>,
) -> Result<Json<PlaceBetResponse>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let bet = state
        .engine
        .place_bet(user_id, body.game, body.bet_type, body.number, body.amount)
        .map_err(|e| ApiError::from_engine(request_id.0.clone(), e))?;

    let wallet = state
        .engine
        .wallet_balance(user_id)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(PlaceBetResponse {
        bet_id: bet.id,
        remaining_balance: money(wallet.balance + wallet.bonus),
    }))
}

/// The calling user's bet history, latest first
/// GET /my-bets
pub async fn my_bets_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BetView>>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let bets = state
        .engine
        .bets_for_user(user_id)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(bets.into_iter().map(BetView::from).collect()))
}

/// Submit a withdrawal request
/// POST /withdraw
pub async fn submit_withdrawal_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithdrawSubmitRequest>,
) -> Result<Json<RequestSubmittedResponse>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let request = state
        .engine
        .submit_withdrawal(user_id, body.amount)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(RequestSubmittedResponse {
        request_id: request.id,
        status: request.status(),
    }))
}

/// Submit a deposit claim with its UTR reference
/// POST /deposit-requests
pub async fn submit_deposit_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<DepositSubmitRequest>,
) -> Result<Json<RequestSubmittedResponse>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let request = state
        .engine
        .submit_deposit(user_id, body.amount, &body.utr_number)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(RequestSubmittedResponse {
        request_id: request.id,
        status: request.status,
    }))
}

/// The calling user's audit rows, latest first
/// GET /transactions
pub async fn transactions_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let rows = state
        .engine
        .transaction_history(user_id)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;
    Ok(Json(rows))
}

/// Referral earnings summary for the calling user
/// GET /user/referrals
pub async fn referral_earnings_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReferralEarnings>, ApiError> {
    let user_id = require_user(&headers, &request_id.0)?;
    let earnings = state
        .engine
        .referral_earnings(user_id)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;
    Ok(Json(earnings))
}
