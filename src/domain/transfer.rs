use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents};

pub type TransferId = i64;

/// A validated request to move money from one account to another.
/// Construction guarantees a positive amount and two distinct accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount_cents: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferValidationError {
    NonPositiveAmount(Cents),
    SameAccount(AccountId),
}

impl std::fmt::Display for TransferValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferValidationError::NonPositiveAmount(amount) => {
                write!(f, "transfer amount must be positive (got {} cents)", amount)
            }
            TransferValidationError::SameAccount(id) => {
                write!(f, "cannot transfer from account {} to itself", id)
            }
        }
    }
}

impl std::error::Error for TransferValidationError {}

impl TransferRequest {
    pub fn new(
        from: AccountId,
        to: AccountId,
        amount_cents: Cents,
    ) -> Result<Self, TransferValidationError> {
        if amount_cents <= 0 {
            return Err(TransferValidationError::NonPositiveAmount(amount_cents));
        }
        if from == to {
            return Err(TransferValidationError::SameAccount(from));
        }
        Ok(Self {
            from,
            to,
            amount_cents,
        })
    }

    /// The two accounts in the order their rows must be locked.
    /// Every transfer locks the lower id first, so two transfers over the
    /// same pair can never wait on each other in a cycle.
    pub fn lock_order(&self) -> [AccountId; 2] {
        if self.from < self.to {
            [self.from, self.to]
        } else {
            [self.to, self.from]
        }
    }
}

/// A committed transfer, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub id: TransferId,
    pub from_account: AccountId,
    pub to_account: AccountId,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    pub recorded_at: DateTime<Utc>,
}
