use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cents;

/// Store-assigned account identifier.
pub type AccountId = i64;

/// A persisted account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    /// Current balance in cents, never negative once committed
    pub balance: Cents,
    /// Balance the account was opened with
    pub opening_balance: Cents,
    pub created_at: DateTime<Utc>,
}

/// An account that has not been inserted yet. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub opening_balance: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    EmptyEmail,
    NegativeOpeningBalance(Cents),
}

impl std::fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountValidationError::EmptyName => write!(f, "account name must not be empty"),
            AccountValidationError::EmptyEmail => write!(f, "account email must not be empty"),
            AccountValidationError::NegativeOpeningBalance(cents) => {
                write!(f, "opening balance must not be negative (got {} cents)", cents)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

impl NewAccount {
    /// Build a new account, trimming name and email.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        opening_balance: Cents,
    ) -> Result<Self, AccountValidationError> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();

        if name.is_empty() {
            return Err(AccountValidationError::EmptyName);
        }
        if email.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if opening_balance < 0 {
            return Err(AccountValidationError::NegativeOpeningBalance(
                opening_balance,
            ));
        }

        Ok(Self {
            name,
            email,
            opening_balance,
        })
    }
}

impl Account {
    pub fn can_afford(&self, amount: Cents) -> bool {
        self.balance >= amount
    }
}
