//! User accounts and registration
//!
//! Users are identified by a unique mobile number (the login handle).
//! Every user gets an immutable, collision-free referral code at
//! creation; the referred-by relation is resolved once at registration
//! and stored as the referrer's id, not as a code copy.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub mobile: String,
    /// Public display code other users register with
    pub referral_code: String,
    /// Referrer resolved at registration; `None` when no valid code was given
    pub referred_by: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Engine {
    /// Register a new user
    ///
    /// Creates the user and an empty wallet, assigns a unique referral
    /// code, and credits the signup bonus to the referrer when the
    /// submitted code resolves to an existing user. Invalid codes are
    /// ignored silently.
    pub fn register_user(
        &self,
        username: &str,
        mobile: &str,
        referral_code: Option<&str>,
    ) -> EngineResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::Validation("username is required".to_string()));
        }
        let mobile = mobile.trim();
        if mobile.len() != 10 || !mobile.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::Validation(
                "mobile must be a 10-digit number".to_string(),
            ));
        }

        // Resolve the referrer before the new user exists so a user can
        // never end up referring themselves.
        let referred_by = referral_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .and_then(|code| self.store.user_id_by_code(code));

        let user_id = self.store.next_user_id();
        if !self.store.reserve_mobile(mobile, user_id) {
            return Err(EngineError::Validation(
                "mobile number already registered".to_string(),
            ));
        }
        let code = self.generate_referral_code(username, user_id)?;

        let user = User {
            id: user_id,
            username: username.to_string(),
            mobile: mobile.to_string(),
            referral_code: code,
            referred_by,
            created_at: Utc::now(),
        };
        self.store.insert_user(user.clone());
        self.store.get_or_create_wallet(user_id);

        if let Some(referrer_id) = referred_by {
            // Referral failures never fail the registration itself.
            if let Err(e) = self.award_signup_bonus(referrer_id, user_id) {
                warn!(referrer_id, user_id, error = %e, "signup bonus skipped");
            }
        }

        Ok(user)
    }

    /// Generate and reserve a collision-free referral code
    ///
    /// First three username characters (uppercased, padded with `X`)
    /// plus four random digits; retries are bounded so a saturated code
    /// space fails deterministically instead of looping.
    fn generate_referral_code(&self, username: &str, user_id: u64) -> EngineResult<String> {
        let mut base: String = username
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_uppercase();
        while base.len() < 3 {
            base.push('X');
        }

        let mut rng = rand::thread_rng();
        for _ in 0..self.config.registration.max_code_attempts {
            let code = format!("{}{:04}", base, rng.gen_range(0..10_000));
            if self.store.reserve_code(&code, user_id) {
                return Ok(code);
            }
        }
        Err(EngineError::Internal(
            "exhausted referral code attempts".to_string(),
        ))
    }

    /// Look up a user by id
    pub fn user(&self, user_id: u64) -> EngineResult<User> {
        self.store
            .user(user_id)
            .ok_or_else(|| EngineError::NotFound(format!("user {}", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rust_decimal_macros::dec;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_register_assigns_code_and_wallet() {
        let engine = engine();
        let user = engine.register_user("ravi", "9876543210", None).unwrap();
        assert_eq!(user.referral_code.len(), 7);
        assert!(user.referral_code.starts_with("RAV"));
        assert!(user.referred_by.is_none());
        let wallet = engine.wallet_balance(user.id).unwrap();
        assert_eq!(wallet.balance, dec!(0));
    }

    #[test]
    fn test_register_rejects_duplicate_mobile() {
        let engine = engine();
        engine.register_user("ravi", "9876543210", None).unwrap();
        let err = engine.register_user("kiran", "9876543210", None).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_register_rejects_bad_mobile() {
        let engine = engine();
        assert!(engine.register_user("ravi", "12345", None).is_err());
        assert!(engine.register_user("ravi", "98765abc10", None).is_err());
    }

    #[test]
    fn test_short_username_pads_code_base() {
        let engine = engine();
        let user = engine.register_user("al", "9876543210", None).unwrap();
        assert!(user.referral_code.starts_with("ALX"));
    }

    #[test]
    fn test_saturated_code_space_fails_cleanly() {
        let engine = engine();
        // Claim every RAV-prefixed code before ravi registers.
        for n in 0..10_000 {
            engine.store.reserve_code(&format!("RAV{:04}", n), 0);
        }
        let err = engine.register_user("ravi", "9876543210", None).unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn test_unknown_referral_code_is_ignored() {
        let engine = engine();
        let user = engine
            .register_user("ravi", "9876543210", Some("NOPE0000"))
            .unwrap();
        assert!(user.referred_by.is_none());
    }

    #[test]
    fn test_valid_referral_links_and_pays_bonus() {
        let engine = engine();
        let referrer = engine.register_user("ravi", "9876543210", None).unwrap();
        let referred = engine
            .register_user("kiran", "9123456780", Some(&referrer.referral_code))
            .unwrap();
        assert_eq!(referred.referred_by, Some(referrer.id));
        let wallet = engine.wallet_balance(referrer.id).unwrap();
        assert_eq!(wallet.bonus, dec!(50.00));
    }
}
