// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tallyhand::application::LedgerService;
use tallyhand::domain::{AccountId, Cents};
use tallyhand::LedgerConfig;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    test_service_with(LedgerConfig::default()).await
}

/// Same as `test_service`, with explicit settings
pub async fn test_service_with(config: LedgerConfig) -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), config).await?;
    Ok((service, temp_dir))
}

/// Create an account with a generated name and email
pub async fn open_account(service: &LedgerService, name: &str, balance: Cents) -> Result<AccountId> {
    let email = format!("{}@mail.com", name.to_lowercase());
    let account = service.create_account(name, &email, balance).await?;
    Ok(account.id)
}

/// Current balance of an account
pub async fn balance_of(service: &LedgerService, id: AccountId) -> Result<Cents> {
    Ok(service.get_account(id).await?.balance)
}

/// Sum of every balance in the ledger, widened like the integrity report
pub async fn ledger_total(service: &LedgerService) -> Result<i128> {
    Ok(service
        .list_accounts()
        .await?
        .iter()
        .map(|a| i128::from(a.balance))
        .sum())
}
