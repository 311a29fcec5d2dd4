use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::config::LedgerConfig;
use crate::domain::{Account, AccountId, NewAccount, TransferReceipt};

use super::{LedgerTx, MIGRATION_001_INITIAL};

/// Statistics for ledger integrity verification.
#[derive(Debug, Clone)]
pub struct IntegrityStats {
    pub transfer_count: i64,
    pub orphan_transfers: i64,
    pub invalid_amounts: i64,
}

/// Repository for persisting and querying accounts and the transfer journal.
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for the given SQLite URL and verify it answers.
    /// With `create` set the database file is created if missing.
    pub async fn connect(database_url: &str, config: &LedgerConfig, create: bool) -> Result<Self> {
        let config = config.clone().normalized();
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(config.max_lifetime)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let repo = Self::new(pool);
        repo.ping().await?;
        tracing::debug!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "connected to {}",
            database_url
        );
        Ok(repo)
    }

    /// Round-trip a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database did not answer ping")?;
        Ok(())
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect, creating the file, and migrate).
    pub async fn init(database_url: &str, config: &LedgerConfig) -> Result<Self> {
        let repo = Self::connect(database_url, config, true).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Start a transaction on a connection owned by the returned handle.
    pub async fn begin(&self) -> Result<LedgerTx> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;
        Ok(LedgerTx::new(tx))
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account and return it with its assigned id.
    pub async fn insert_account(&self, account: &NewAccount) -> Result<Account> {
        let row = sqlx::query(concat!(
            "INSERT INTO accounts (name, email, balance, opening_balance, created_at) ",
            "VALUES (?, ?, ?, ?, ?) RETURNING ",
            account_columns!()
        ))
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.opening_balance)
        .bind(account.opening_balance)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert account")?;

        row_to_account(&row)
    }

    /// Get an account by id.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            account_columns!(),
            " FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch account {}", id))?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// List all accounts ordered by id.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            account_columns!(),
            " FROM accounts ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(row_to_account).collect()
    }

    /// Stream all accounts ordered by id, one row at a time.
    /// Each call runs the query again, so a stream can be restarted by calling
    /// this method again.
    pub fn stream_accounts(&self) -> impl Stream<Item = Result<Account>> + '_ {
        sqlx::query(concat!(
            "SELECT ",
            account_columns!(),
            " FROM accounts ORDER BY id"
        ))
        .fetch(&self.pool)
        .map(|row| {
            let row = row.context("Failed to stream accounts")?;
            row_to_account(&row)
        })
    }

    // ========================
    // Journal operations
    // ========================

    /// List committed transfers in the order they were recorded.
    pub async fn list_transfers(&self) -> Result<Vec<TransferReceipt>> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_account_id, to_account_id, amount_cents, recorded_at
            FROM transfers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transfers")?;

        rows.iter().map(row_to_receipt).collect()
    }

    /// Get statistics for integrity checking.
    pub async fn get_integrity_stats(&self) -> Result<IntegrityStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as transfer_count,
                COALESCE(SUM(CASE
                    WHEN NOT EXISTS (SELECT 1 FROM accounts a WHERE a.id = t.from_account_id)
                      OR NOT EXISTS (SELECT 1 FROM accounts a WHERE a.id = t.to_account_id)
                    THEN 1 ELSE 0 END), 0) as orphan_transfers,
                COALESCE(SUM(CASE WHEN amount_cents <= 0 THEN 1 ELSE 0 END), 0) as invalid_amounts
            FROM transfers t
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to collect integrity stats")?;

        Ok(IntegrityStats {
            transfer_count: row.get("transfer_count"),
            orphan_transfers: row.get("orphan_transfers"),
            invalid_amounts: row.get("invalid_amounts"),
        })
    }
}

pub(super) fn row_to_account(row: &SqliteRow) -> Result<Account> {
    let created_at_str: String = row.get("created_at");

    Ok(Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        balance: row.get("balance"),
        opening_balance: row.get("opening_balance"),
        created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
    })
}

pub(super) fn row_to_receipt(row: &SqliteRow) -> Result<TransferReceipt> {
    let recorded_at_str: String = row.get("recorded_at");

    Ok(TransferReceipt {
        id: row.get("id"),
        from_account: row.get("from_account_id"),
        to_account: row.get("to_account_id"),
        amount_cents: row.get("amount_cents"),
        recorded_at: parse_timestamp(&recorded_at_str).context("Invalid recorded_at timestamp")?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
