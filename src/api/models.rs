//! API Request/Response Models
//!
//! DTOs for the HTTP surface. Monetary pools serialize as 2-dp strings
//! the way the original wallet API exposed them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::games::types::{Bet, BetType, Game};
use crate::requests::{DepositRequest, RequestAction, RequestStatus, WithdrawRequest};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub mobile: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user_id: u64,
    pub referral_code: String,
}

/// Wallet pools, each rendered with two decimal places
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: String,
    pub bonus: String,
    pub winnings: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceBetRequest {
    pub game: Game,
    pub bet_type: BetType,
    pub number: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaceBetResponse {
    pub bet_id: u64,
    pub remaining_balance: String,
}

/// A bet as shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct BetView {
    pub id: u64,
    pub game: Game,
    pub bet_type: BetType,
    pub number: i32,
    pub amount: Decimal,
    pub is_win: bool,
    pub payout: Decimal,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Bet> for BetView {
    fn from(bet: Bet) -> Self {
        Self {
            id: bet.id,
            game: bet.game,
            bet_type: bet.bet_type,
            number: bet.number,
            amount: bet.amount,
            is_win: bet.is_win,
            payout: bet.payout,
            settled: bet.settled,
            created_at: bet.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawSubmitRequest {
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepositSubmitRequest {
    pub amount: Decimal,
    pub utr_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestSubmittedResponse {
    pub request_id: u64,
    pub status: RequestStatus,
}

/// Operator decision payload for deposit and withdraw actions
#[derive(Debug, Clone, Deserialize)]
pub struct RequestActionBody {
    pub request_id: u64,
    pub action: RequestAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestActionResponse {
    pub request_id: u64,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeclareResultRequest {
    pub game: Game,
    pub winning_number: i32,
    /// Settlement day; defaults to today (UTC)
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// A deposit request as shown on the operator screen
#[derive(Debug, Clone, Serialize)]
pub struct DepositRequestView {
    pub id: u64,
    pub user_id: u64,
    pub amount: Decimal,
    pub utr_number: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<DepositRequest> for DepositRequestView {
    fn from(r: DepositRequest) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            amount: r.amount,
            utr_number: r.utr_number,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

/// A withdraw request as shown on the operator screen
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequestView {
    pub id: u64,
    pub user_id: u64,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<WithdrawRequest> for WithdrawRequestView {
    fn from(r: WithdrawRequest) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            amount: r.amount,
            status: r.status(),
            created_at: r.created_at,
        }
    }
}

/// Render a pool with exactly two decimal places
pub fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}
