//! Referral commissions
//!
//! Two events generate commissions: a referred user signing up (flat
//! bonus) and a referred user winning a qualifying bet (a fraction of
//! the payout). Commission records are append-only; aggregation is a
//! pure read over them.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::wallet::Pool;

/// What triggered a commission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionKind {
    SignupBonus,
    BetCommission,
}

/// Immutable commission record linking referrer and referred user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralCommission {
    pub id: u64,
    pub referrer_id: u64,
    pub referred_user_id: u64,
    /// Triggering bet for bet-driven commissions
    pub bet_id: Option<u64>,
    pub kind: CommissionKind,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Read-side aggregation over a referrer's commission history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralEarnings {
    pub referral_code: String,
    pub total_referrals: usize,
    pub total_earnings: Decimal,
    pub commissions: Vec<ReferralCommission>,
}

impl Engine {
    /// Credit the flat signup bonus to a referrer
    ///
    /// At most one signup-bonus record exists per referred user; the
    /// wallet credit and the record are written under the referrer's
    /// wallet lock.
    pub(crate) fn award_signup_bonus(
        &self,
        referrer_id: u64,
        referred_user_id: u64,
    ) -> EngineResult<()> {
        if self.store.user(referrer_id).is_none() {
            return Err(EngineError::ReferenceNotFound(format!(
                "referrer {}",
                referrer_id
            )));
        }
        if self.store.signup_bonus_exists(referred_user_id) {
            return Err(EngineError::AlreadyProcessed(format!(
                "signup bonus for user {}",
                referred_user_id
            )));
        }

        let bonus = self.config.referral.signup_bonus;
        let row = self.store.get_or_create_wallet(referrer_id);
        let mut wallet = row.lock().map_err(|_| poisoned())?;
        wallet.credit(Pool::Bonus, bonus)?;
        self.store.append_commission(ReferralCommission {
            id: 0, // assigned by the store
            referrer_id,
            referred_user_id,
            bet_id: None,
            kind: CommissionKind::SignupBonus,
            amount: bonus,
            created_at: Utc::now(),
        });
        Ok(())
    }

    /// Credit a bet commission to a referrer
    ///
    /// Called by settlement after a qualifying winning bet. At most one
    /// bet-commission record exists per bet.
    pub(crate) fn award_bet_commission(
        &self,
        referrer_id: u64,
        referred_user_id: u64,
        bet_id: u64,
        payout: Decimal,
    ) -> EngineResult<Decimal> {
        if self.store.user(referrer_id).is_none() {
            return Err(EngineError::ReferenceNotFound(format!(
                "referrer {}",
                referrer_id
            )));
        }
        if self.store.bet_commission_exists(bet_id) {
            return Err(EngineError::AlreadyProcessed(format!(
                "commission for bet {}",
                bet_id
            )));
        }

        let commission = (payout * self.config.referral.bet_commission_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

        let row = self.store.get_or_create_wallet(referrer_id);
        let mut wallet = row.lock().map_err(|_| poisoned())?;
        wallet.credit(Pool::Bonus, commission)?;
        self.store.append_commission(ReferralCommission {
            id: 0,
            referrer_id,
            referred_user_id,
            bet_id: Some(bet_id),
            kind: CommissionKind::BetCommission,
            amount: commission,
            created_at: Utc::now(),
        });
        Ok(commission)
    }

    /// Referral earnings view for a user
    pub fn referral_earnings(&self, user_id: u64) -> EngineResult<ReferralEarnings> {
        let user = self.user(user_id)?;
        let mut commissions = self.store.commissions_for_referrer(user_id);
        commissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_referrals = commissions
            .iter()
            .filter(|c| c.kind == CommissionKind::SignupBonus)
            .count();
        let total_earnings = commissions.iter().map(|c| c.amount).sum();

        Ok(ReferralEarnings {
            referral_code: user.referral_code,
            total_referrals,
            total_earnings,
            commissions,
        })
    }
}

fn poisoned() -> EngineError {
    EngineError::Internal("wallet lock poisoned".to_string())
}
