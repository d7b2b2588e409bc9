//! Operator API handlers
//!
//! Result declaration and deposit/withdraw request actions, gated by
//! the `x-admin-key` header.

use super::{
    errors::ApiError,
    handlers::AppState,
    middleware::{require_admin, RequestId},
    models::*,
};
use crate::games::types::SettlementSummary;
use axum::{extract::State, http::HeaderMap, Extension, Json};
use chrono::Utc;
use std::sync::Arc;

/// POST /admin/declare-result - settle a game's pending bets for a day
pub async fn declare_result_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeclareResultRequest>,
) -> Result<Json<SettlementSummary>, ApiError> {
    require_admin(&headers, state.admin_key.as_deref(), &request_id.0)?;

    let day = body.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state
        .engine
        .declare_result(body.game, body.winning_number, day)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(summary))
}

/// GET /admin/deposit-requests - pending deposit claims, oldest first
pub async fn pending_deposits_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DepositRequestView>>, ApiError> {
    require_admin(&headers, state.admin_key.as_deref(), &request_id.0)?;
    let rows = state.engine.pending_deposits();
    Ok(Json(rows.into_iter().map(DepositRequestView::from).collect()))
}

/// POST /admin/deposit-action - approve or reject a deposit exactly once
pub async fn deposit_action_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestActionBody>,
) -> Result<Json<RequestActionResponse>, ApiError> {
    require_admin(&headers, state.admin_key.as_deref(), &request_id.0)?;

    let request = state
        .engine
        .act_on_deposit(body.request_id, body.action)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(RequestActionResponse {
        request_id: request.id,
        status: request.status,
    }))
}

/// GET /admin/withdraw-requests - pending withdrawals, oldest first
pub async fn pending_withdrawals_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WithdrawRequestView>>, ApiError> {
    require_admin(&headers, state.admin_key.as_deref(), &request_id.0)?;
    let rows = state.engine.pending_withdrawals();
    Ok(Json(rows.into_iter().map(WithdrawRequestView::from).collect()))
}

/// POST /admin/withdraw-action - approve or reject a withdrawal
pub async fn withdraw_action_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestActionBody>,
) -> Result<Json<RequestActionResponse>, ApiError> {
    require_admin(&headers, state.admin_key.as_deref(), &request_id.0)?;

    let request = state
        .engine
        .act_on_withdrawal(body.request_id, body.action)
        .map_err(|e| ApiError::from_engine(request_id.0, e))?;

    Ok(Json(RequestActionResponse {
        request_id: request.id,
        status: request.status(),
    }))
}
