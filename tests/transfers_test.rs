mod common;

use anyhow::Result;
use common::{balance_of, ledger_total, open_account, test_service};
use tallyhand::application::AppError;

#[tokio::test]
async fn test_transfer_moves_money() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let alice = open_account(&service, "Alice", 10000).await?;
    let bob = open_account(&service, "Bob", 20000).await?;

    let receipt = service.transfer(alice, bob, 5000).await?;

    assert_eq!(receipt.from_account, alice);
    assert_eq!(receipt.to_account, bob);
    assert_eq!(receipt.amount_cents, 5000);
    assert_eq!(balance_of(&service, alice).await?, 5000);
    assert_eq!(balance_of(&service, bob).await?, 25000);

    Ok(())
}

#[tokio::test]
async fn test_transfer_conserves_pair_total() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 12345).await?;
    let b = open_account(&service, "B", 678).await?;

    for amount in [1, 99, 5000, 7000] {
        let before = balance_of(&service, a).await? + balance_of(&service, b).await?;
        service.transfer(a, b, amount).await?;
        let after = balance_of(&service, a).await? + balance_of(&service, b).await?;
        assert_eq!(before, after);
    }

    Ok(())
}

#[tokio::test]
async fn test_transfer_of_entire_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 3000).await?;
    let b = open_account(&service, "B", 0).await?;

    service.transfer(a, b, 3000).await?;

    assert_eq!(balance_of(&service, a).await?, 0);
    assert_eq!(balance_of(&service, b).await?, 3000);
    Ok(())
}

#[tokio::test]
async fn test_insufficient_funds_leaves_balances_unchanged() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 3000).await?;
    let b = open_account(&service, "B", 1000).await?;

    let err = service.transfer(a, b, 5000).await.unwrap_err();
    match err {
        AppError::InsufficientFunds {
            account_id,
            balance,
            required,
        } => {
            assert_eq!(account_id, a);
            assert_eq!(balance, 3000);
            assert_eq!(required, 5000);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }

    assert_eq!(balance_of(&service, a).await?, 3000);
    assert_eq!(balance_of(&service, b).await?, 1000);
    assert!(service.list_transfers().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_sender_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let b = open_account(&service, "B", 1000).await?;

    let err = service.transfer(999, b, 10).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(999)));
    assert_eq!(balance_of(&service, b).await?, 1000);
    Ok(())
}

#[tokio::test]
async fn test_missing_receiver_does_not_debit_sender() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 10000).await?;

    let err = service.transfer(a, 999, 1000).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(999)));

    assert_eq!(balance_of(&service, a).await?, 10000);
    assert_eq!(ledger_total(&service).await?, 10000);
    assert!(service.list_transfers().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rejects_non_positive_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 10000).await?;
    let b = open_account(&service, "B", 10000).await?;

    for amount in [0, -500] {
        let err = service.transfer(a, b, amount).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "amount {amount}");
    }

    assert_eq!(balance_of(&service, a).await?, 10000);
    assert_eq!(balance_of(&service, b).await?, 10000);
    Ok(())
}

#[tokio::test]
async fn test_rejects_self_transfer() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 10000).await?;

    let err = service.transfer(a, a, 100).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(balance_of(&service, a).await?, 10000);
    Ok(())
}

#[tokio::test]
async fn test_transfers_are_journaled_in_order() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = open_account(&service, "A", 10000).await?;
    let b = open_account(&service, "B", 10000).await?;

    service.transfer(a, b, 100).await?;
    service.transfer(b, a, 250).await?;
    // Rejected, must not appear in the journal
    let _ = service.transfer(a, b, 1_000_000).await;

    let journal = service.list_transfers().await?;
    assert_eq!(journal.len(), 2);
    assert_eq!((journal[0].from_account, journal[0].amount_cents), (a, 100));
    assert_eq!((journal[1].from_account, journal[1].amount_cents), (b, 250));
    assert!(journal[0].id < journal[1].id);
    Ok(())
}

#[tokio::test]
async fn test_credit_past_i64_max_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let rich = open_account(&service, "Rich", i64::MAX - 10).await?;
    let poor = open_account(&service, "Poor", 100).await?;

    let err = service.transfer(poor, rich, 100).await.unwrap_err();
    match err {
        AppError::BalanceOverflow {
            account_id,
            balance,
            amount,
        } => {
            assert_eq!(account_id, rich);
            assert_eq!(balance, i64::MAX - 10);
            assert_eq!(amount, 100);
        }
        other => panic!("expected BalanceOverflow, got {other:?}"),
    }

    // Both rows still decode as integers and are unchanged
    assert_eq!(balance_of(&service, rich).await?, i64::MAX - 10);
    assert_eq!(balance_of(&service, poor).await?, 100);
    assert!(service.list_transfers().await?.is_empty());

    // A credit that still fits goes through
    service.transfer(poor, rich, 10).await?;
    assert_eq!(balance_of(&service, rich).await?, i64::MAX);
    Ok(())
}

#[tokio::test]
async fn test_schema_refuses_overflowing_balance_update() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let rich = open_account(&service, "Rich", i64::MAX - 10).await?;

    let mut tx = service.repository().begin().await?;
    let result = tx.update_balance(rich, 100).await;
    assert!(result.is_err(), "overflowing update must fail, got {result:?}");
    drop(tx);

    assert_eq!(balance_of(&service, rich).await?, i64::MAX - 10);
    Ok(())
}
