//! betledger - Wallet Ledger & Bet-Settlement Engine
//!
//! Core of a numbers-draw betting platform: three-pool wallets with
//! atomic debit/credit primitives, bet placement and tiered settlement,
//! referral commission cascades, and manually-reconciled deposit and
//! withdrawal request lifecycles. An axum HTTP layer binds the engine
//! to the outside world; authentication and persistence mechanics stay
//! with external collaborators.

pub mod api;
pub mod config;
pub mod engine;
pub mod errors;
pub mod games;
pub mod referral;
pub mod requests;
pub mod store;
pub mod users;
pub mod wallet;

pub use config::EngineConfig;
pub use engine::Engine;
pub use errors::{EngineError, EngineResult};
