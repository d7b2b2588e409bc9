//! Bet placement
//!
//! Validation happens strictly before any mutation; the debit and the
//! bet record are written under the bettor's wallet lock so a bet can
//! never exist without its stake having been taken, or vice versa.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{Bet, BetType, Game};
use crate::wallet::DebitPreference;

impl Engine {
    /// Place a bet, debiting the stake from `balance` then `bonus`
    ///
    /// Validation order: positive amount, number within the bet type's
    /// range, sufficient `balance + bonus`. The created bet starts
    /// pending (`settled = false`, zero payout).
    pub fn place_bet(
        &self,
        user_id: u64,
        game: Game,
        bet_type: BetType,
        number: i32,
        amount: Decimal,
    ) -> EngineResult<Bet> {
        self.user(user_id)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "bet amount must be positive, got {}",
                amount
            )));
        }
        bet_type.validate_number(number)?;

        let row = self.store.get_or_create_wallet(user_id);
        let mut wallet = row
            .lock()
            .map_err(|_| EngineError::Internal("wallet lock poisoned".to_string()))?;
        wallet.debit(amount, DebitPreference::BalanceThenBonus)?;

        let bet = Bet {
            id: self.store.next_bet_id(),
            user_id,
            game,
            bet_type,
            number,
            amount,
            is_win: false,
            payout: Decimal::ZERO,
            settled: false,
            created_at: Utc::now(),
        };
        // Still under the wallet lock: debit and record land together.
        self.store.insert_bet(bet.clone());
        Ok(bet)
    }

    /// A user's bet history, latest first
    pub fn bets_for_user(&self, user_id: u64) -> EngineResult<Vec<Bet>> {
        self.user(user_id)?;
        let mut bets = self.store.bets_for_user(user_id);
        bets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bets)
    }
}
