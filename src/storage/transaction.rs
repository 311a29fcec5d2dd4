use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, Transaction};

use crate::domain::{Account, AccountId, Cents, TransferReceipt, TransferRequest};

use super::repository::{row_to_account, row_to_receipt};

/// A database transaction that owns its pooled connection.
///
/// Dropping a `LedgerTx` without calling [`LedgerTx::commit`] rolls it back,
/// so every early return, panic or cancelled future leaves the store as it
/// was before [`Repository::begin`](super::Repository::begin). The connection
/// goes back to the pool once the handle is consumed or dropped.
pub struct LedgerTx {
    tx: Transaction<'static, Sqlite>,
}

impl LedgerTx {
    pub(super) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Take write locks on the given account rows, in the order given.
    ///
    /// SQLite locks the whole database on the first write of a transaction,
    /// so the first no-op update here blocks (up to the busy timeout) until
    /// competing writers have finished. Doing this before any read means a
    /// balance read afterwards can't be stale.
    pub async fn lock_accounts(&mut self, ids: &[AccountId]) -> Result<()> {
        for &id in ids {
            let result = sqlx::query("UPDATE accounts SET balance = balance WHERE id = ?")
                .bind(id)
                .execute(&mut *self.tx)
                .await
                .with_context(|| format!("Failed to lock account {}", id))?;
            tracing::debug!(account_id = id, found = result.rows_affected() > 0, "locked row");
        }
        Ok(())
    }

    /// Read an account inside this transaction.
    pub async fn read_account(&mut self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            account_columns!(),
            " FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to read account {}", id))?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// Add `delta` (which may be negative) to an account balance.
    /// Returns the number of rows affected: 0 means the account does not exist.
    pub async fn update_balance(&mut self, id: AccountId, delta: Cents) -> Result<u64> {
        let result = sqlx::query("UPDATE accounts SET balance = balance + ? WHERE id = ?")
            .bind(delta)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .with_context(|| format!("Failed to update balance of account {}", id))?;
        Ok(result.rows_affected())
    }

    /// Append a journal row for the transfer.
    pub async fn record_transfer(&mut self, request: &TransferRequest) -> Result<TransferReceipt> {
        let row = sqlx::query(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount_cents, recorded_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, from_account_id, to_account_id, amount_cents, recorded_at
            "#,
        )
        .bind(request.from)
        .bind(request.to)
        .bind(request.amount_cents)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to record transfer")?;

        row_to_receipt(&row)
    }

    /// Commit. If this fails the outcome is unknown to the caller.
    pub async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit transaction; outcome unknown")
    }

    /// Roll back explicitly.
    pub async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .context("Failed to roll back transaction")
    }
}
