mod common;

use anyhow::Result;
use common::{open_account, test_service};

#[tokio::test]
async fn test_empty_ledger_is_healthy() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let report = service.check_integrity().await?;

    assert_eq!(report.account_count, 0);
    assert_eq!(report.transfer_count, 0);
    assert!(report.is_healthy());
    Ok(())
}

#[tokio::test]
async fn test_healthy_after_mixed_outcomes() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 10000).await?;
    let b = open_account(&service, "B", 20000).await?;

    service.transfer(a, b, 5000).await?;
    assert!(service.transfer(a, b, 999_999).await.is_err());
    assert!(service.transfer(a, 404, 100).await.is_err());
    assert!(service.transfer(404, a, 100).await.is_err());
    service.transfer(b, a, 2500).await?;

    let report = service.check_integrity().await?;

    assert_eq!(report.account_count, 2);
    assert_eq!(report.transfer_count, 2);
    assert_eq!(report.total_balance, 30000);
    assert_eq!(report.total_opening_balance, 30000);
    assert!(report.is_healthy(), "issues: {:?}", report.issues);
    Ok(())
}

#[tokio::test]
async fn test_reopening_database_keeps_state() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("ledger.db");
    let path = db_path.to_str().unwrap();

    let (a, b) = {
        let service =
            tallyhand::application::LedgerService::init(path, Default::default()).await?;
        let a = open_account(&service, "A", 10000).await?;
        let b = open_account(&service, "B", 0).await?;
        service.transfer(a, b, 4000).await?;
        service.repository().close().await;
        (a, b)
    };

    let service = tallyhand::application::LedgerService::connect(path, Default::default()).await?;
    assert_eq!(service.get_account(a).await?.balance, 6000);
    assert_eq!(service.get_account(b).await?.balance, 4000);
    assert_eq!(service.list_transfers().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_connect_to_missing_database_fails() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("missing.db");

    let result =
        tallyhand::application::LedgerService::connect(db_path.to_str().unwrap(), Default::default())
            .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_check_handles_totals_beyond_i64() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let half = i64::MAX / 2 + 1;
    let a = open_account(&service, "A", half).await?;
    let b = open_account(&service, "B", half).await?;
    service.transfer(a, b, 1).await?;

    let report = service.check_integrity().await?;

    assert_eq!(report.total_balance, 2 * half as i128);
    assert_eq!(report.total_opening_balance, 2 * half as i128);
    assert!(report.is_healthy(), "issues: {:?}", report.issues);
    Ok(())
}
