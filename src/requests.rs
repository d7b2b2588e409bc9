//! Deposit and withdrawal request lifecycles
//!
//! Deposits are manually-reconciled: the user submits an amount plus a
//! UTR reference, an operator approves or rejects exactly once, and
//! approval credits the wallet atomically with the status write.
//! Withdrawals keep the twin approved/rejected flags of the original
//! data model; funds are not reserved at submission, so approval
//! re-checks the balance before debiting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::wallet::{DebitPreference, Pool};

/// Lifecycle states of a request, also used for audit rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Operator decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Approve,
    Reject,
}

/// A user's claim of an off-platform deposit, keyed by UTR reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    pub id: u64,
    pub user_id: u64,
    pub amount: Decimal,
    pub utr_number: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// A withdrawal request with twin terminal flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub id: u64,
    pub user_id: u64,
    pub amount: Decimal,
    pub is_approved: bool,
    pub is_rejected: bool,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl WithdrawRequest {
    pub fn status(&self) -> RequestStatus {
        if self.is_approved {
            RequestStatus::Approved
        } else if self.is_rejected {
            RequestStatus::Rejected
        } else {
            RequestStatus::Pending
        }
    }
}

/// Kind of money movement an audit row records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

/// Append-only audit entry; never mutated after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub user_id: u64,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Engine {
    /// Submit a deposit claim for manual reconciliation
    pub fn submit_deposit(
        &self,
        user_id: u64,
        amount: Decimal,
        utr_number: &str,
    ) -> EngineResult<DepositRequest> {
        self.user(user_id)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "deposit amount must be positive, got {}",
                amount
            )));
        }
        let utr = utr_number.trim();
        if utr.len() < self.config.requests.min_utr_length {
            return Err(EngineError::Validation(format!(
                "UTR must be at least {} characters",
                self.config.requests.min_utr_length
            )));
        }

        let request = DepositRequest {
            id: self.store.next_request_id(),
            user_id,
            amount,
            utr_number: utr.to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            approved_at: None,
        };
        self.store.insert_deposit(request.clone());
        Ok(request)
    }

    /// Approve or reject a pending deposit exactly once
    ///
    /// Approval credits `balance` atomically with the status write; a
    /// second action on the same request fails with `AlreadyProcessed`
    /// and leaves the wallet unchanged.
    pub fn act_on_deposit(
        &self,
        request_id: u64,
        action: RequestAction,
    ) -> EngineResult<DepositRequest> {
        let mut entry = self
            .store
            .deposit_mut(request_id)
            .ok_or_else(|| EngineError::NotFound(format!("deposit request {}", request_id)))?;
        if entry.status != RequestStatus::Pending {
            return Err(EngineError::AlreadyProcessed(format!(
                "deposit request {}",
                request_id
            )));
        }

        match action {
            RequestAction::Approve => {
                let row = self.store.get_or_create_wallet(entry.user_id);
                let mut wallet = row
                    .lock()
                    .map_err(|_| EngineError::Internal("wallet lock poisoned".to_string()))?;
                wallet.credit(Pool::Balance, entry.amount)?;
                entry.status = RequestStatus::Approved;
                entry.approved_at = Some(Utc::now());
            }
            RequestAction::Reject => {
                entry.status = RequestStatus::Rejected;
            }
        }

        let request = entry.clone();
        drop(entry);

        self.append_audit(
            request.user_id,
            TransactionType::Deposit,
            request.amount,
            request.status,
            Some(format!("UTR {}", request.utr_number)),
        );
        Ok(request)
    }

    /// Submit a withdrawal request
    ///
    /// Requires `balance >= amount` at submission time; the funds stay
    /// spendable until an operator approves.
    pub fn submit_withdrawal(&self, user_id: u64, amount: Decimal) -> EngineResult<WithdrawRequest> {
        self.user(user_id)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "withdrawal amount must be positive, got {}",
                amount
            )));
        }

        {
            let row = self.store.get_or_create_wallet(user_id);
            let wallet = row
                .lock()
                .map_err(|_| EngineError::Internal("wallet lock poisoned".to_string()))?;
            if wallet.balance < amount {
                return Err(EngineError::InsufficientFunds {
                    required: amount,
                    available: wallet.balance,
                });
            }
        }

        let request = WithdrawRequest {
            id: self.store.next_request_id(),
            user_id,
            amount,
            is_approved: false,
            is_rejected: false,
            created_at: Utc::now(),
            approved_at: None,
        };
        self.store.insert_withdrawal(request.clone());
        Ok(request)
    }

    /// Approve or reject a pending withdrawal exactly once
    ///
    /// An already-actioned request is treated as gone (`NotFound`).
    /// Approval re-checks the balance, debits it, and stamps the
    /// approval time; both outcomes append an audit row.
    pub fn act_on_withdrawal(
        &self,
        request_id: u64,
        action: RequestAction,
    ) -> EngineResult<WithdrawRequest> {
        let mut entry = self
            .store
            .withdrawal_mut(request_id)
            .ok_or_else(|| EngineError::NotFound(format!("withdraw request {}", request_id)))?;
        if entry.is_approved || entry.is_rejected {
            return Err(EngineError::NotFound(format!(
                "withdraw request {} already actioned",
                request_id
            )));
        }

        match action {
            RequestAction::Approve => {
                let row = self.store.get_or_create_wallet(entry.user_id);
                let mut wallet = row
                    .lock()
                    .map_err(|_| EngineError::Internal("wallet lock poisoned".to_string()))?;
                // Funds may have been spent since submission.
                wallet.debit(entry.amount, DebitPreference::BalanceOnly)?;
                entry.is_approved = true;
                entry.approved_at = Some(Utc::now());
            }
            RequestAction::Reject => {
                entry.is_rejected = true;
            }
        }

        let request = entry.clone();
        drop(entry);

        self.append_audit(
            request.user_id,
            TransactionType::Withdraw,
            request.amount,
            request.status(),
            None,
        );
        Ok(request)
    }

    /// A user's audit rows, latest first
    pub fn transaction_history(&self, user_id: u64) -> EngineResult<Vec<Transaction>> {
        self.user(user_id)?;
        let mut rows = self.store.transactions_for_user(user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// Pending deposit requests for the operator screen, oldest first
    pub fn pending_deposits(&self) -> Vec<DepositRequest> {
        let mut rows = self.store.pending_deposits();
        rows.sort_by_key(|r| r.id);
        rows
    }

    /// Pending withdrawal requests for the operator screen, oldest first
    pub fn pending_withdrawals(&self) -> Vec<WithdrawRequest> {
        let mut rows = self.store.pending_withdrawals();
        rows.sort_by_key(|r| r.id);
        rows
    }

    fn append_audit(
        &self,
        user_id: u64,
        transaction_type: TransactionType,
        amount: Decimal,
        status: RequestStatus,
        note: Option<String>,
    ) {
        self.store.append_transaction(Transaction {
            id: 0, // assigned by the store
            user_id,
            transaction_type,
            amount,
            status,
            note,
            created_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rust_decimal_macros::dec;

    fn engine_with_user() -> (Engine, u64) {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let user = engine.register_user("ravi", "9876543210", None).unwrap();
        (engine, user.id)
    }

    fn fund(engine: &Engine, user_id: u64, amount: Decimal) {
        let request = engine
            .submit_deposit(user_id, amount, "UTR12345678")
            .unwrap();
        engine
            .act_on_deposit(request.id, RequestAction::Approve)
            .unwrap();
    }

    #[test]
    fn test_deposit_approval_credits_balance_once() {
        let (engine, user_id) = engine_with_user();
        let request = engine
            .submit_deposit(user_id, dec!(500), "UTR12345678")
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let approved = engine
            .act_on_deposit(request.id, RequestAction::Approve)
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(engine.wallet_balance(user_id).unwrap().balance, dec!(500));

        let err = engine
            .act_on_deposit(request.id, RequestAction::Approve)
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyProcessed(_)));
        assert_eq!(engine.wallet_balance(user_id).unwrap().balance, dec!(500));
    }

    #[test]
    fn test_deposit_rejection_leaves_wallet_untouched() {
        let (engine, user_id) = engine_with_user();
        let request = engine
            .submit_deposit(user_id, dec!(500), "UTR12345678")
            .unwrap();
        let rejected = engine
            .act_on_deposit(request.id, RequestAction::Reject)
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert_eq!(engine.wallet_balance(user_id).unwrap().balance, dec!(0));
    }

    #[test]
    fn test_deposit_validates_utr_and_amount() {
        let (engine, user_id) = engine_with_user();
        assert!(matches!(
            engine.submit_deposit(user_id, dec!(100), "short"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            engine.submit_deposit(user_id, dec!(0), "UTR12345678"),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_withdrawal_requires_submission_balance() {
        let (engine, user_id) = engine_with_user();
        fund(&engine, user_id, dec!(100));
        assert!(matches!(
            engine.submit_withdrawal(user_id, dec!(150)),
            Err(EngineError::InsufficientFunds { .. })
        ));
        assert!(engine.submit_withdrawal(user_id, dec!(100)).is_ok());
    }

    #[test]
    fn test_withdrawal_approval_recheck_catches_spent_funds() {
        let (engine, user_id) = engine_with_user();
        fund(&engine, user_id, dec!(200));
        let request = engine.submit_withdrawal(user_id, dec!(200)).unwrap();

        // Balance drops between submission and approval.
        let spend = engine.submit_withdrawal(user_id, dec!(50)).unwrap();
        engine
            .act_on_withdrawal(spend.id, RequestAction::Approve)
            .unwrap();

        let err = engine
            .act_on_withdrawal(request.id, RequestAction::Approve)
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        // Request stays pending and retryable.
        assert_eq!(engine.pending_withdrawals().len(), 1);
    }

    #[test]
    fn test_withdrawal_terminal_flags_are_exclusive() {
        let (engine, user_id) = engine_with_user();
        fund(&engine, user_id, dec!(100));
        let request = engine.submit_withdrawal(user_id, dec!(100)).unwrap();
        let approved = engine
            .act_on_withdrawal(request.id, RequestAction::Approve)
            .unwrap();
        assert!(approved.is_approved && !approved.is_rejected);
        assert!(approved.approved_at.is_some());
        assert_eq!(engine.wallet_balance(user_id).unwrap().balance, dec!(0));

        let err = engine
            .act_on_withdrawal(request.id, RequestAction::Reject)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_audit_rows_accumulate() {
        let (engine, user_id) = engine_with_user();
        fund(&engine, user_id, dec!(100));
        let request = engine.submit_withdrawal(user_id, dec!(40)).unwrap();
        engine
            .act_on_withdrawal(request.id, RequestAction::Reject)
            .unwrap();

        let rows = engine.transaction_history(user_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .any(|t| t.transaction_type == TransactionType::Deposit
                && t.status == RequestStatus::Approved));
        assert!(rows
            .iter()
            .any(|t| t.transaction_type == TransactionType::Withdraw
                && t.status == RequestStatus::Rejected));
    }
}
