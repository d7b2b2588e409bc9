//! Wallet pools and atomic debit/credit primitives
//!
//! Every user owns exactly one wallet with three independently
//! accounted pools. All three pools stay non-negative at every
//! observable point; the store's per-wallet row lock makes each
//! read-modify-write of these pools a single atomic unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// One of the three named sub-balances of a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// Deposited, withdrawable funds
    Balance,
    /// Promotional and referral funds, not independently withdrawable
    Bonus,
    /// Payout accumulator
    Winnings,
}

/// Order in which a debit consumes pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitPreference {
    /// Consume `balance` first, then draw the remainder from `bonus`
    BalanceThenBonus,
    /// Consume `balance` only (withdrawals)
    BalanceOnly,
}

/// Per-user wallet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: u64,
    pub balance: Decimal,
    pub bonus: Decimal,
    pub winnings: Decimal,
}

impl Wallet {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            balance: Decimal::ZERO,
            bonus: Decimal::ZERO,
            winnings: Decimal::ZERO,
        }
    }

    /// Funds eligible for the given debit preference
    pub fn available(&self, preference: DebitPreference) -> Decimal {
        match preference {
            DebitPreference::BalanceThenBonus => self.balance + self.bonus,
            DebitPreference::BalanceOnly => self.balance,
        }
    }

    /// Add `amount` to the named pool
    pub fn credit(&mut self, pool: Pool, amount: Decimal) -> EngineResult<()> {
        if amount < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "credit amount must be non-negative, got {}",
                amount
            )));
        }
        match pool {
            Pool::Balance => self.balance += amount,
            Pool::Bonus => self.bonus += amount,
            Pool::Winnings => self.winnings += amount,
        }
        Ok(())
    }

    /// Deduct `amount` across pools in preference order
    ///
    /// Fails without touching any pool when the eligible pools sum to
    /// less than `amount`; no pool ever goes negative.
    pub fn debit(&mut self, amount: Decimal, preference: DebitPreference) -> EngineResult<()> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "debit amount must be positive, got {}",
                amount
            )));
        }
        let available = self.available(preference);
        if available < amount {
            return Err(EngineError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        match preference {
            DebitPreference::BalanceOnly => {
                self.balance -= amount;
            }
            DebitPreference::BalanceThenBonus => {
                if self.balance >= amount {
                    self.balance -= amount;
                } else {
                    let remainder = amount - self.balance;
                    self.balance = Decimal::ZERO;
                    self.bonus -= remainder;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn funded(balance: Decimal, bonus: Decimal) -> Wallet {
        let mut wallet = Wallet::new(1);
        wallet.balance = balance;
        wallet.bonus = bonus;
        wallet
    }

    #[test]
    fn test_new_wallet_is_empty() {
        let wallet = Wallet::new(7);
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.bonus, Decimal::ZERO);
        assert_eq!(wallet.winnings, Decimal::ZERO);
    }

    #[test]
    fn test_debit_prefers_balance() {
        let mut wallet = funded(dec!(100), dec!(50));
        wallet.debit(dec!(80), DebitPreference::BalanceThenBonus).unwrap();
        assert_eq!(wallet.balance, dec!(20));
        assert_eq!(wallet.bonus, dec!(50));
    }

    #[test]
    fn test_debit_spills_into_bonus() {
        let mut wallet = funded(dec!(30), dec!(50));
        wallet.debit(dec!(70), DebitPreference::BalanceThenBonus).unwrap();
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.bonus, dec!(10));
    }

    #[test]
    fn test_debit_exact_total_drains_wallet() {
        let mut wallet = funded(dec!(30), dec!(70));
        wallet.debit(dec!(100), DebitPreference::BalanceThenBonus).unwrap();
        assert_eq!(wallet.balance + wallet.bonus, Decimal::ZERO);
    }

    #[test]
    fn test_debit_insufficient_leaves_wallet_unchanged() {
        let mut wallet = funded(dec!(30), dec!(50));
        let before = wallet.clone();
        let err = wallet
            .debit(dec!(81), DebitPreference::BalanceThenBonus)
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_balance_only_ignores_bonus() {
        let mut wallet = funded(dec!(30), dec!(500));
        let err = wallet.debit(dec!(40), DebitPreference::BalanceOnly).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        wallet.debit(dec!(30), DebitPreference::BalanceOnly).unwrap();
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.bonus, dec!(500));
    }

    #[test]
    fn test_credit_rejects_negative() {
        let mut wallet = Wallet::new(1);
        assert!(matches!(
            wallet.credit(Pool::Bonus, dec!(-5)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_debit_rejects_zero() {
        let mut wallet = funded(dec!(10), Decimal::ZERO);
        assert!(matches!(
            wallet.debit(Decimal::ZERO, DebitPreference::BalanceOnly),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
