use serde::Serialize;

use super::{format_cents, Account, AccountId, Cents};

/// Result of a ledger integrity check.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub account_count: usize,
    pub transfer_count: i64,
    /// Sum of all current balances, widened so large ledgers cannot overflow
    pub total_balance: i128,
    /// Sum of all opening balances
    pub total_opening_balance: i128,
    pub is_balanced: bool,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.is_balanced && self.issues.is_empty()
    }
}

/// Sum of all balances. Transfers never change this value.
pub fn total_balance(accounts: &[Account]) -> i128 {
    accounts.iter().map(|a| i128::from(a.balance)).sum()
}

/// Sum of all opening balances.
pub fn total_opening_balance(accounts: &[Account]) -> i128 {
    accounts.iter().map(|a| i128::from(a.opening_balance)).sum()
}

/// Accounts whose balance dropped below zero.
pub fn negative_accounts(accounts: &[Account]) -> Vec<AccountId> {
    accounts
        .iter()
        .filter(|a| a.balance < 0)
        .map(|a| a.id)
        .collect()
}

/// Build an integrity report from the current account rows and journal stats.
pub fn build_integrity_report(
    accounts: &[Account],
    transfer_count: i64,
    orphan_transfers: i64,
    invalid_amounts: i64,
) -> IntegrityReport {
    let total = total_balance(accounts);
    let opening = total_opening_balance(accounts);
    let is_balanced = total == opening;

    let mut issues = Vec::new();
    if !is_balanced {
        issues.push(format!(
            "Total balance {} differs from total opening balance {}",
            format_cents(total),
            format_cents(opening)
        ));
    }
    for id in negative_accounts(accounts) {
        issues.push(format!("Account {} has a negative balance", id));
    }
    if orphan_transfers > 0 {
        issues.push(format!(
            "{} journal entries reference unknown accounts",
            orphan_transfers
        ));
    }
    if invalid_amounts > 0 {
        issues.push(format!(
            "{} journal entries have a non-positive amount",
            invalid_amounts
        ));
    }

    IntegrityReport {
        account_count: accounts.len(),
        transfer_count,
        total_balance: total,
        total_opening_balance: opening,
        is_balanced,
        issues,
    }
}
