//! Game catalogue, bet records and the payout tier table

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// Draw games offered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Game {
    #[serde(rename = "gali")]
    Gali,
    #[serde(rename = "faridabad")]
    Faridabad,
    #[serde(rename = "disawer")]
    Disawer,
    #[serde(rename = "ghaziabad")]
    Ghaziabad,
    #[serde(rename = "jaipur king")]
    JaipurKing,
    #[serde(rename = "diamond king")]
    DiamondKing,
}

impl Game {
    pub fn tier(&self) -> GameTier {
        match self {
            Game::JaipurKing | Game::DiamondKing => GameTier::Premium,
            Game::Gali | Game::Faridabad | Game::Disawer | Game::Ghaziabad => {
                GameTier::CommissionEligible
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Gali => "gali",
            Game::Faridabad => "faridabad",
            Game::Disawer => "disawer",
            Game::Ghaziabad => "ghaziabad",
            Game::JaipurKing => "jaipur king",
            Game::DiamondKing => "diamond king",
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payout tier a game belongs to
///
/// Premium games pay full stake multiples and generate no referral
/// commission; commission-eligible games pay below full multiples,
/// with part of the difference redirected to referral commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameTier {
    Premium,
    CommissionEligible,
}

/// Category a bet is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    Number,
    Andar,
    Bahar,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Number => "number",
            BetType::Andar => "andar",
            BetType::Bahar => "bahar",
        }
    }

    /// Inclusive number range mandated by this bet type
    pub fn number_range(&self) -> (i32, i32) {
        match self {
            BetType::Number => (1, 100),
            BetType::Andar | BetType::Bahar => (0, 9),
        }
    }

    /// Reject numbers outside the mandated range
    pub fn validate_number(&self, number: i32) -> EngineResult<()> {
        let (min, max) = self.number_range();
        if number < min || number > max {
            return Err(EngineError::InvalidNumberRange {
                bet_type: self.as_str(),
                number,
                min,
                max,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed payout multiplier keyed by (game tier, bet type)
pub fn payout_multiplier(tier: GameTier, bet_type: BetType) -> Decimal {
    match (tier, bet_type) {
        (GameTier::Premium, BetType::Number) => Decimal::from(100),
        (GameTier::Premium, BetType::Andar | BetType::Bahar) => Decimal::from(10),
        (GameTier::CommissionEligible, BetType::Number) => Decimal::new(91, 2), // 0.91
        (GameTier::CommissionEligible, BetType::Andar | BetType::Bahar) => Decimal::from(9),
    }
}

/// A recorded bet
///
/// Pending until settlement writes the outcome fields; once `settled`
/// is set the bet is terminal and never re-settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: u64,
    pub user_id: u64,
    pub game: Game,
    pub bet_type: BetType,
    pub number: i32,
    pub amount: Decimal,
    pub is_win: bool,
    pub payout: Decimal,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one result declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub game: Option<Game>,
    pub winning_number: i32,
    pub bets_considered: usize,
    pub winners: usize,
    pub losers: usize,
    pub total_payout: Decimal,
    pub commissions_paid: usize,
}
