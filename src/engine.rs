//! Engine facade
//!
//! One shared object owning the ledger store and configuration. The
//! operation groups live next to their entities: registration in
//! `users`, bet placement in `games::betting`, settlement in
//! `games::settlement`, commissions in `referral`, request lifecycles
//! in `requests`.

use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::store::LedgerStore;
use crate::wallet::Wallet;

/// Wallet ledger and bet-settlement engine
pub struct Engine {
    pub(crate) store: LedgerStore,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            store: LedgerStore::new(),
            config,
        })
    }

    /// Snapshot of a user's wallet pools
    pub fn wallet_balance(&self, user_id: u64) -> EngineResult<Wallet> {
        self.user(user_id)?;
        let row = self.store.get_or_create_wallet(user_id);
        let wallet = row
            .lock()
            .map_err(|_| EngineError::Internal("wallet lock poisoned".to_string()))?;
        Ok(wallet.clone())
    }
}
