//! Result declaration and bet settlement
//!
//! Settlement resolves every pending bet a game received on a given
//! day against the declared winning number. Each bet settles exactly
//! once: the persisted `settled` flag is re-checked under the bettor's
//! wallet lock before any credit, so re-declaring a result is a
//! per-bet no-op. The batch is not one transaction; a failure leaves
//! the remaining bets pending and the declaration retryable.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{payout_multiplier, BetType, Game, GameTier, SettlementSummary};
use crate::wallet::Pool;

impl Engine {
    /// Declare the winning number for a game on a given day
    ///
    /// Winning bets are credited to the `winnings` pool at the tier
    /// multiplier, rounded to 2 dp (half-even). A winning `number` bet
    /// on a commission-eligible game by a referred user then pays the
    /// referrer a commission; an unresolvable referrer never fails the
    /// settlement.
    pub fn declare_result(
        &self,
        game: Game,
        winning_number: i32,
        as_of: NaiveDate,
    ) -> EngineResult<SettlementSummary> {
        if !(0..=100).contains(&winning_number) {
            return Err(EngineError::Validation(format!(
                "winning number {} out of range (0-100)",
                winning_number
            )));
        }

        let mut summary = SettlementSummary {
            game: Some(game),
            winning_number,
            ..Default::default()
        };

        for bet_id in self.store.pending_bet_ids(game, as_of) {
            match self.settle_bet(bet_id, winning_number)? {
                Settled::Win { payout, referral } => {
                    summary.bets_considered += 1;
                    summary.winners += 1;
                    summary.total_payout += payout;
                    if referral {
                        summary.commissions_paid += 1;
                    }
                }
                Settled::Loss => {
                    summary.bets_considered += 1;
                    summary.losers += 1;
                }
                Settled::AlreadySettled => {}
            }
        }

        info!(
            game = %game,
            winning_number,
            winners = summary.winners,
            losers = summary.losers,
            total_payout = %summary.total_payout,
            "result declared"
        );
        Ok(summary)
    }

    /// Settle one bet as a single atomic unit
    fn settle_bet(&self, bet_id: u64, winning_number: i32) -> EngineResult<Settled> {
        let snapshot = match self.store.bet(bet_id) {
            Some(bet) => bet,
            None => return Ok(Settled::AlreadySettled),
        };
        if snapshot.settled {
            return Ok(Settled::AlreadySettled);
        }

        let row = self.store.get_or_create_wallet(snapshot.user_id);
        let mut wallet = row
            .lock()
            .map_err(|_| EngineError::Internal("wallet lock poisoned".to_string()))?;
        let mut bet = self
            .store
            .bet_mut(bet_id)
            .ok_or_else(|| EngineError::Internal(format!("bet {} vanished", bet_id)))?;
        // Guard against a concurrent declaration for the same day.
        if bet.settled {
            return Ok(Settled::AlreadySettled);
        }

        if bet.number != winning_number {
            bet.is_win = false;
            bet.payout = Decimal::ZERO;
            bet.settled = true;
            return Ok(Settled::Loss);
        }

        let multiplier = payout_multiplier(bet.game.tier(), bet.bet_type);
        let payout = (bet.amount * multiplier)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        wallet.credit(Pool::Winnings, payout)?;
        bet.is_win = true;
        bet.payout = payout;
        bet.settled = true;

        let bettor_id = bet.user_id;
        let qualifies =
            bet.bet_type == BetType::Number && bet.game.tier() == GameTier::CommissionEligible;
        drop(bet);
        drop(wallet);

        let mut referral = false;
        if qualifies {
            referral = self.cascade_bet_commission(bettor_id, bet_id, payout);
        }
        Ok(Settled::Win { payout, referral })
    }

    /// Referral leg of a winning bet; failures are swallowed
    fn cascade_bet_commission(&self, bettor_id: u64, bet_id: u64, payout: Decimal) -> bool {
        let referrer_id = match self.store.user(bettor_id).and_then(|u| u.referred_by) {
            Some(id) => id,
            None => return false,
        };
        match self.award_bet_commission(referrer_id, bettor_id, bet_id, payout) {
            Ok(_) => true,
            Err(e) => {
                warn!(bet_id, bettor_id, referrer_id, error = %e, "bet commission skipped");
                false
            }
        }
    }
}

enum Settled {
    Win { payout: Decimal, referral: bool },
    Loss,
    AlreadySettled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::requests::RequestAction;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    fn funded_user(engine: &Engine, username: &str, mobile: &str, amount: Decimal) -> u64 {
        let user = engine.register_user(username, mobile, None).unwrap();
        let request = engine.submit_deposit(user.id, amount, "UTR12345678").unwrap();
        engine
            .act_on_deposit(request.id, RequestAction::Approve)
            .unwrap();
        user.id
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn test_commission_tier_number_win_pays_91_percent() {
        let engine = engine();
        let user_id = funded_user(&engine, "ravi", "9876543210", dec!(100));
        engine
            .place_bet(user_id, Game::Gali, BetType::Number, 45, dec!(100))
            .unwrap();

        let summary = engine.declare_result(Game::Gali, 45, today()).unwrap();
        assert_eq!(summary.winners, 1);
        assert_eq!(summary.total_payout, dec!(91.00));
        assert_eq!(engine.wallet_balance(user_id).unwrap().winnings, dec!(91.00));
    }

    #[test]
    fn test_premium_tier_multipliers() {
        let engine = engine();
        let user_id = funded_user(&engine, "ravi", "9876543210", dec!(30));
        engine
            .place_bet(user_id, Game::JaipurKing, BetType::Number, 7, dec!(10))
            .unwrap();
        engine
            .place_bet(user_id, Game::JaipurKing, BetType::Andar, 7, dec!(10))
            .unwrap();
        engine
            .place_bet(user_id, Game::DiamondKing, BetType::Bahar, 3, dec!(10))
            .unwrap();

        engine.declare_result(Game::JaipurKing, 7, today()).unwrap();
        engine.declare_result(Game::DiamondKing, 3, today()).unwrap();

        // 10 * 100 + 10 * 10 + 10 * 10
        assert_eq!(
            engine.wallet_balance(user_id).unwrap().winnings,
            dec!(1200.00)
        );
    }

    #[test]
    fn test_losing_bet_settles_without_credit() {
        let engine = engine();
        let user_id = funded_user(&engine, "ravi", "9876543210", dec!(100));
        engine
            .place_bet(user_id, Game::Gali, BetType::Number, 45, dec!(100))
            .unwrap();

        let summary = engine.declare_result(Game::Gali, 46, today()).unwrap();
        assert_eq!(summary.losers, 1);
        assert_eq!(summary.winners, 0);
        let bet = &engine.bets_for_user(user_id).unwrap()[0];
        assert!(bet.settled && !bet.is_win);
        assert_eq!(engine.wallet_balance(user_id).unwrap().winnings, dec!(0));
    }

    #[test]
    fn test_redeclaration_is_a_no_op() {
        let engine = engine();
        let user_id = funded_user(&engine, "ravi", "9876543210", dec!(100));
        engine
            .place_bet(user_id, Game::Gali, BetType::Number, 45, dec!(100))
            .unwrap();

        engine.declare_result(Game::Gali, 45, today()).unwrap();
        let again = engine.declare_result(Game::Gali, 45, today()).unwrap();
        assert_eq!(again.bets_considered, 0);
        assert_eq!(engine.wallet_balance(user_id).unwrap().winnings, dec!(91.00));
    }

    #[test]
    fn test_referred_winner_pays_referrer_commission() {
        let engine = engine();
        let referrer = engine.register_user("ravi", "9876543210", None).unwrap();
        let referred = engine
            .register_user("kiran", "9123456780", Some(&referrer.referral_code))
            .unwrap();
        let request = engine
            .submit_deposit(referred.id, dec!(100), "UTR12345678")
            .unwrap();
        engine
            .act_on_deposit(request.id, RequestAction::Approve)
            .unwrap();
        engine
            .place_bet(referred.id, Game::Gali, BetType::Number, 45, dec!(100))
            .unwrap();

        let summary = engine.declare_result(Game::Gali, 45, today()).unwrap();
        assert_eq!(summary.commissions_paid, 1);
        // 50 signup bonus + 1% of the 91.00 payout
        let wallet = engine.wallet_balance(referrer.id).unwrap();
        assert_eq!(wallet.bonus, dec!(50.91));

        // Re-declaring cannot double-pay the commission either.
        engine.declare_result(Game::Gali, 45, today()).unwrap();
        let wallet = engine.wallet_balance(referrer.id).unwrap();
        assert_eq!(wallet.bonus, dec!(50.91));
    }

    #[test]
    fn test_premium_win_generates_no_commission() {
        let engine = engine();
        let referrer = engine.register_user("ravi", "9876543210", None).unwrap();
        let referred = engine
            .register_user("kiran", "9123456780", Some(&referrer.referral_code))
            .unwrap();
        let request = engine
            .submit_deposit(referred.id, dec!(100), "UTR12345678")
            .unwrap();
        engine
            .act_on_deposit(request.id, RequestAction::Approve)
            .unwrap();
        engine
            .place_bet(referred.id, Game::JaipurKing, BetType::Number, 45, dec!(100))
            .unwrap();

        let summary = engine.declare_result(Game::JaipurKing, 45, today()).unwrap();
        assert_eq!(summary.commissions_paid, 0);
        assert_eq!(
            engine.wallet_balance(referrer.id).unwrap().bonus,
            dec!(50.00)
        );
    }

    #[test]
    fn test_other_days_and_games_stay_pending() {
        let engine = engine();
        let user_id = funded_user(&engine, "ravi", "9876543210", dec!(100));
        engine
            .place_bet(user_id, Game::Gali, BetType::Number, 45, dec!(50))
            .unwrap();
        engine
            .place_bet(user_id, Game::Faridabad, BetType::Number, 45, dec!(50))
            .unwrap();

        let summary = engine.declare_result(Game::Gali, 45, today()).unwrap();
        assert_eq!(summary.bets_considered, 1);
        let pending: Vec<_> = engine
            .bets_for_user(user_id)
            .unwrap()
            .into_iter()
            .filter(|b| !b.settled)
            .collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].game, Game::Faridabad);

        let yesterday = today().pred_opt().unwrap();
        let summary = engine
            .declare_result(Game::Faridabad, 45, yesterday)
            .unwrap();
        assert_eq!(summary.bets_considered, 0);
    }

    #[test]
    fn test_rejects_out_of_range_winning_number() {
        let engine = engine();
        assert!(matches!(
            engine.declare_result(Game::Gali, 101, today()),
            Err(EngineError::Validation(_))
        ));
    }
}
