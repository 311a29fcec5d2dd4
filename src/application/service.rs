use std::time::Duration;

use futures::{Stream, TryStreamExt};

use crate::config::LedgerConfig;
use crate::domain::{
    build_integrity_report, Account, AccountId, Cents, IntegrityReport, NewAccount,
    TransferReceipt, TransferRequest,
};
use crate::storage::{LedgerTx, Repository};

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct LedgerService {
    repo: Repository,
    config: LedgerConfig,
}

impl LedgerService {
    /// Create a new ledger service on top of an existing repository.
    pub fn new(repo: Repository) -> Self {
        Self::with_config(repo, LedgerConfig::default())
    }

    pub fn with_config(repo: Repository, config: LedgerConfig) -> Self {
        Self { repo, config }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str, config: LedgerConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::init(&db_url, &config).await?;
        Ok(Self::with_config(repo, config))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str, config: LedgerConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url, &config, false).await?;
        Ok(Self::with_config(repo, config))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Account operations
    // ========================

    /// Create a new account with the given opening balance.
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        opening_balance: Cents,
    ) -> Result<Account, AppError> {
        let new_account = NewAccount::new(name, email, opening_balance)?;
        let account = self.repo.insert_account(&new_account).await?;
        tracing::info!(account_id = account.id, "created account {}", account.name);
        Ok(account)
    }

    /// Get an account by id.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))
    }

    /// List all accounts ordered by id.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    /// Lazily stream all accounts ordered by id.
    pub fn stream_accounts(&self) -> impl Stream<Item = Result<Account, AppError>> + '_ {
        self.repo.stream_accounts().map_err(AppError::from)
    }

    // ========================
    // Transfer operations
    // ========================

    /// Move `amount_cents` from one account to another using the configured
    /// transfer timeout.
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount_cents: Cents,
    ) -> Result<TransferReceipt, AppError> {
        self.transfer_within(from, to, amount_cents, self.config.transfer_timeout)
            .await
    }

    /// Move `amount_cents` from one account to another, giving up after
    /// `timeout`. The deadline covers everything up to the commit; a transfer
    /// that misses it is rolled back. A commit that fails is reported as
    /// `AppError::Store` and its outcome is unknown.
    pub async fn transfer_within(
        &self,
        from: AccountId,
        to: AccountId,
        amount_cents: Cents,
        timeout: Duration,
    ) -> Result<TransferReceipt, AppError> {
        let request = TransferRequest::new(from, to, amount_cents)?;

        // Dropping the in-flight future drops its LedgerTx, which rolls back.
        let (tx, receipt) =
            match tokio::time::timeout(timeout, self.prepare_transfer(request)).await {
                Ok(prepared) => prepared?,
                Err(_) => {
                    tracing::warn!(from, to, "transfer timed out after {:?}", timeout);
                    return Err(AppError::TransferTimedOut {
                        from,
                        to,
                        after: timeout,
                    });
                }
            };

        tx.commit().await?;
        tracing::info!(
            transfer_id = receipt.id,
            from,
            to,
            amount_cents,
            "transfer committed"
        );
        Ok(receipt)
    }

    /// Run the transfer inside a fresh transaction and hand it back uncommitted.
    async fn prepare_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<(LedgerTx, TransferReceipt), AppError> {
        let mut tx = self.repo.begin().await?;

        match apply_transfer(&mut tx, &request).await {
            Ok(receipt) => Ok((tx, receipt)),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("rollback after failed transfer failed: {:#}", rollback_err);
                }
                tracing::warn!(from = request.from, to = request.to, "transfer rejected: {}", err);
                Err(err)
            }
        }
    }

    /// List committed transfers.
    pub async fn list_transfers(&self) -> Result<Vec<TransferReceipt>, AppError> {
        Ok(self.repo.list_transfers().await?)
    }

    // ========================
    // Integrity operations
    // ========================

    /// Check that money was conserved and no balance went negative.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let accounts = self.repo.list_accounts().await?;
        let stats = self.repo.get_integrity_stats().await?;

        Ok(build_integrity_report(
            &accounts,
            stats.transfer_count,
            stats.orphan_transfers,
            stats.invalid_amounts,
        ))
    }
}

/// Debit, credit and journal a transfer inside `tx`. Nothing is committed here.
async fn apply_transfer(
    tx: &mut LedgerTx,
    request: &TransferRequest,
) -> Result<TransferReceipt, AppError> {
    tx.lock_accounts(&request.lock_order()).await?;

    let sender = tx
        .read_account(request.from)
        .await?
        .ok_or(AppError::AccountNotFound(request.from))?;

    if !sender.can_afford(request.amount_cents) {
        return Err(AppError::InsufficientFunds {
            account_id: sender.id,
            balance: sender.balance,
            required: request.amount_cents,
        });
    }

    let receiver = tx
        .read_account(request.to)
        .await?
        .ok_or(AppError::AccountNotFound(request.to))?;

    // SQLite would widen an overflowing sum to REAL instead of failing.
    if receiver.balance.checked_add(request.amount_cents).is_none() {
        return Err(AppError::BalanceOverflow {
            account_id: receiver.id,
            balance: receiver.balance,
            amount: request.amount_cents,
        });
    }

    if tx.update_balance(request.from, -request.amount_cents).await? == 0 {
        return Err(AppError::AccountNotFound(request.from));
    }
    // A credit that touches no rows must not commit the debit.
    if tx.update_balance(request.to, request.amount_cents).await? == 0 {
        return Err(AppError::AccountNotFound(request.to));
    }

    Ok(tx.record_transfer(request).await?)
}
