//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::{admin::*, handlers::*};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check (high priority)
        .route("/health", get(health_handler))
        // Registration (open)
        .route("/register", post(register_handler))
        // User wallet and betting
        .route("/balance", get(balance_handler))
        .route("/place-bet", post(place_bet_handler))
        .route("/my-bets", get(my_bets_handler))
        .route("/withdraw", post(submit_withdrawal_handler))
        .route("/deposit-requests", post(submit_deposit_handler))
        .route("/transactions", get(transactions_handler))
        .route("/user/referrals", get(referral_earnings_handler))
        // Operator endpoints (admin-key gated)
        .route("/admin/declare-result", post(declare_result_handler))
        .route("/admin/deposit-requests", get(pending_deposits_handler))
        .route("/admin/deposit-action", post(deposit_action_handler))
        .route("/admin/withdraw-requests", get(pending_withdrawals_handler))
        .route("/admin/withdraw-action", post(withdraw_action_handler))
        // Attach shared state
        .with_state(state)
}
