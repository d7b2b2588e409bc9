//! Bet placement and settlement
//!
//! `types` holds the game catalogue and bet records, `betting` places
//! bets against the wallet, `settlement` resolves pending bets against
//! a declared winning number.

pub mod betting;
pub mod settlement;
pub mod types;
