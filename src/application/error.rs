use std::time::Duration;

use thiserror::Error;

use crate::domain::{AccountId, AccountValidationError, Cents, TransferValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Insufficient funds in account {account_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Cents,
        required: Cents,
    },

    #[error("Crediting {amount} to account {account_id} would overflow its balance of {balance}")]
    BalanceOverflow {
        account_id: AccountId,
        balance: Cents,
        amount: Cents,
    },

    #[error("Transfer from {from} to {to} timed out after {after:?} and was rolled back")]
    TransferTimedOut {
        from: AccountId,
        to: AccountId,
        after: Duration,
    },

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl From<AccountValidationError> for AppError {
    fn from(err: AccountValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<TransferValidationError> for AppError {
    fn from(err: TransferValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}
