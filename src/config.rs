//! Configuration management with validation and defaults
//!
//! Centralized configuration for the ledger engine and its HTTP surface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// Top-level engine configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub referral: ReferralConfig,
    #[serde(default)]
    pub requests: RequestConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
}

/// Referral commission parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferralConfig {
    /// Flat bonus credited to a referrer when a referred user signs up
    pub signup_bonus: Decimal,
    /// Fraction of a qualifying payout passed to the referrer
    pub bet_commission_rate: Decimal,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            signup_bonus: Decimal::new(5000, 2),        // 50.00
            bet_commission_rate: Decimal::new(1, 2),    // 0.01
        }
    }
}

/// Deposit/withdraw request parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Minimum accepted length of a UTR reference string
    pub min_utr_length: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { min_utr_length: 8 }
    }
}

/// User registration parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Attempts at generating a collision-free referral code before
    /// the operation fails
    pub max_code_attempts: u32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: 32,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values before the engine starts
    pub fn validate(&self) -> EngineResult<()> {
        if self.referral.signup_bonus < Decimal::ZERO {
            return Err(EngineError::Validation(
                "referral.signup_bonus must be non-negative".to_string(),
            ));
        }
        if self.referral.bet_commission_rate < Decimal::ZERO
            || self.referral.bet_commission_rate >= Decimal::ONE
        {
            return Err(EngineError::Validation(
                "referral.bet_commission_rate must be in [0, 1)".to_string(),
            ));
        }
        if self.requests.min_utr_length == 0 {
            return Err(EngineError::Validation(
                "requests.min_utr_length must be at least 1".to_string(),
            ));
        }
        if self.registration.max_code_attempts == 0 {
            return Err(EngineError::Validation(
                "registration.max_code_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load(path: &str) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Validation(format!("failed to read config {}: {}", path, e)))?;
        let config: EngineConfig = toml::from_str(&raw)
            .map_err(|e| EngineError::Validation(format!("failed to parse config {}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.referral.signup_bonus, dec!(50.00));
        assert_eq!(config.referral.bet_commission_rate, dec!(0.01));
        assert_eq!(config.requests.min_utr_length, 8);
    }

    #[test]
    fn test_rejects_negative_bonus() {
        let mut config = EngineConfig::default();
        config.referral.signup_bonus = dec!(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_commission_rate_of_one() {
        let mut config = EngineConfig::default();
        config.referral.bet_commission_rate = Decimal::ONE;
        assert!(config.validate().is_err());
    }
}
