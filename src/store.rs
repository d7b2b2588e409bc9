//! Ledger store
//!
//! In-process tables for every entity plus the per-wallet row locks
//! that make compound wallet operations atomic. Every operation that
//! reads a wallet and writes it back must hold that wallet's lock for
//! the whole read-modify-write, including any sibling rows it appends.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;

use crate::games::types::{Bet, Game};
use crate::referral::{CommissionKind, ReferralCommission};
use crate::requests::{DepositRequest, RequestStatus, Transaction, WithdrawRequest};
use crate::users::User;
use crate::wallet::Wallet;

/// Shared ledger state
///
/// Wallets are wrapped in `Arc<Mutex<..>>` so callers can take a row
/// lock without holding any table shard. Bets, requests and audit rows
/// live in sharded maps; id allocation is atomic.
#[derive(Default)]
pub struct LedgerStore {
    users: DashMap<u64, User>,
    users_by_mobile: DashMap<String, u64>,
    users_by_code: DashMap<String, u64>,
    wallets: DashMap<u64, Arc<Mutex<Wallet>>>,
    bets: DashMap<u64, Bet>,
    deposits: DashMap<u64, DepositRequest>,
    withdrawals: DashMap<u64, WithdrawRequest>,
    transactions: DashMap<u64, Transaction>,
    commissions: DashMap<u64, ReferralCommission>,

    next_user_id: AtomicU64,
    next_bet_id: AtomicU64,
    next_request_id: AtomicU64,
    next_transaction_id: AtomicU64,
    next_commission_id: AtomicU64,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- id allocation ---

    pub fn next_user_id(&self) -> u64 {
        self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn next_bet_id(&self) -> u64 {
        self.next_bet_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn next_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    // --- users ---

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn user(&self, user_id: u64) -> Option<User> {
        self.users.get(&user_id).map(|u| u.clone())
    }

    pub fn user_id_by_code(&self, code: &str) -> Option<u64> {
        self.users_by_code.get(code).map(|id| *id)
    }

    /// Claim a mobile number; false when it is already taken
    pub fn reserve_mobile(&self, mobile: &str, user_id: u64) -> bool {
        match self.users_by_mobile.entry(mobile.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(user_id);
                true
            }
        }
    }

    /// Claim a referral code; false on collision
    pub fn reserve_code(&self, code: &str, user_id: u64) -> bool {
        match self.users_by_code.entry(code.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(user_id);
                true
            }
        }
    }

    // --- wallets ---

    /// Fetch a user's wallet row, creating an empty one on first access
    pub fn get_or_create_wallet(&self, user_id: u64) -> Arc<Mutex<Wallet>> {
        self.wallets
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Wallet::new(user_id))))
            .clone()
    }

    // --- bets ---

    pub fn insert_bet(&self, bet: Bet) {
        self.bets.insert(bet.id, bet);
    }

    pub fn bet(&self, bet_id: u64) -> Option<Bet> {
        self.bets.get(&bet_id).map(|b| b.clone())
    }

    pub fn bet_mut(&self, bet_id: u64) -> Option<RefMut<'_, u64, Bet>> {
        self.bets.get_mut(&bet_id)
    }

    pub fn bets_for_user(&self, user_id: u64) -> Vec<Bet> {
        self.bets
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.clone())
            .collect()
    }

    /// Ids of unsettled bets for a game placed on the given day
    pub fn pending_bet_ids(&self, game: Game, day: NaiveDate) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .bets
            .iter()
            .filter(|b| !b.settled && b.game == game && b.created_at.date_naive() == day)
            .map(|b| b.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // --- deposit / withdraw requests ---

    pub fn insert_deposit(&self, request: DepositRequest) {
        self.deposits.insert(request.id, request);
    }

    pub fn deposit_mut(&self, request_id: u64) -> Option<RefMut<'_, u64, DepositRequest>> {
        self.deposits.get_mut(&request_id)
    }

    pub fn pending_deposits(&self) -> Vec<DepositRequest> {
        self.deposits
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .map(|r| r.clone())
            .collect()
    }

    pub fn insert_withdrawal(&self, request: WithdrawRequest) {
        self.withdrawals.insert(request.id, request);
    }

    pub fn withdrawal_mut(&self, request_id: u64) -> Option<RefMut<'_, u64, WithdrawRequest>> {
        self.withdrawals.get_mut(&request_id)
    }

    pub fn pending_withdrawals(&self) -> Vec<WithdrawRequest> {
        self.withdrawals
            .iter()
            .filter(|r| !r.is_approved && !r.is_rejected)
            .map(|r| r.clone())
            .collect()
    }

    // --- audit log ---

    pub fn append_transaction(&self, mut row: Transaction) {
        row.id = self.next_transaction_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.transactions.insert(row.id, row);
    }

    pub fn transactions_for_user(&self, user_id: u64) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.clone())
            .collect()
    }

    // --- referral commissions ---

    pub fn append_commission(&self, mut row: ReferralCommission) {
        row.id = self.next_commission_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.commissions.insert(row.id, row);
    }

    pub fn commissions_for_referrer(&self, referrer_id: u64) -> Vec<ReferralCommission> {
        self.commissions
            .iter()
            .filter(|c| c.referrer_id == referrer_id)
            .map(|c| c.clone())
            .collect()
    }

    pub fn signup_bonus_exists(&self, referred_user_id: u64) -> bool {
        self.commissions.iter().any(|c| {
            c.kind == CommissionKind::SignupBonus && c.referred_user_id == referred_user_id
        })
    }

    pub fn bet_commission_exists(&self, bet_id: u64) -> bool {
        self.commissions
            .iter()
            .any(|c| c.kind == CommissionKind::BetCommission && c.bet_id == Some(bet_id))
    }
}
