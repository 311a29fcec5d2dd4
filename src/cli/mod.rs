use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::application::LedgerService;
use crate::config::LedgerConfig;
use crate::domain::{format_cents, parse_cents, Account, AccountId};

mod demo;

/// Tallyhand - atomic account-to-account transfers
#[derive(Parser)]
#[command(name = "tallyhand")]
#[command(about = "Move money between accounts without ever losing a cent")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "TALLYHAND_DATABASE", default_value = "tallyhand.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub pool: PoolArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection pool and timeout settings.
#[derive(Args, Debug, Clone)]
pub struct PoolArgs {
    /// Maximum number of open connections
    #[arg(long, env = "TALLYHAND_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Connections kept open while idle
    #[arg(long, env = "TALLYHAND_MIN_CONNECTIONS", default_value_t = 5)]
    pub min_connections: u32,

    /// Recycle connections older than this many seconds
    #[arg(long, env = "TALLYHAND_MAX_LIFETIME_SECS", default_value_t = 300)]
    pub max_lifetime_secs: u64,

    /// Give up on a transfer after this many seconds
    #[arg(long, env = "TALLYHAND_TRANSFER_TIMEOUT_SECS", default_value_t = 5)]
    pub transfer_timeout_secs: u64,
}

impl PoolArgs {
    pub fn to_config(&self) -> LedgerConfig {
        LedgerConfig {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            max_lifetime: Duration::from_secs(self.max_lifetime_secs),
            transfer_timeout: Duration::from_secs(self.transfer_timeout_secs),
            ..LedgerConfig::default()
        }
        .normalized()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Transfer money between two accounts
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        amount: String,

        /// Source account id
        #[arg(long)]
        from: AccountId,

        /// Destination account id
        #[arg(long)]
        to: AccountId,
    },

    /// List committed transfers
    Transfers,

    /// Verify that money was conserved
    Check,

    /// Create two sample accounts and move money between them
    Demo,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Display name
        name: String,

        /// Contact email
        email: String,

        /// Opening balance (e.g., "100.00")
        #[arg(short, long, default_value = "0")]
        balance: String,
    },

    /// List all accounts
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single account
    Show {
        /// Account id
        id: AccountId,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.pool.to_config();

        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database, config).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Account(account_cmd) => {
                let service = LedgerService::connect(&self.database, config).await?;
                run_account_command(&service, account_cmd).await?;
            }

            Commands::Transfer { amount, from, to } => {
                let service = LedgerService::connect(&self.database, config).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let receipt = service.transfer(from, to, amount_cents).await?;
                println!(
                    "Transferred {} from account {} to account {} (transfer #{})",
                    format_cents(receipt.amount_cents),
                    receipt.from_account,
                    receipt.to_account,
                    receipt.id
                );
            }

            Commands::Transfers => {
                let service = LedgerService::connect(&self.database, config).await?;
                run_transfers_command(&service).await?;
            }

            Commands::Check => {
                let service = LedgerService::connect(&self.database, config).await?;
                run_check_command(&service).await?;
            }

            Commands::Demo => {
                let service = LedgerService::init(&self.database, config).await?;
                demo::run(&service).await?;
            }
        }

        Ok(())
    }
}

async fn run_account_command(service: &LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            name,
            email,
            balance,
        } => {
            let opening = parse_cents(&balance)
                .context("Invalid balance format. Use '100.00' or '100'")?;
            let account = service.create_account(&name, &email, opening).await?;
            println!(
                "Created account {}: {} ({})",
                account.id,
                account.name,
                format_cents(account.balance)
            );
        }

        AccountCommands::List { json } => {
            let accounts = service.list_accounts().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&accounts)?);
            } else {
                print_accounts(&accounts);
            }
        }

        AccountCommands::Show { id } => {
            let account = service.get_account(id).await?;
            println!("Account: {}", account.name);
            println!("  ID:              {}", account.id);
            println!("  Email:           {}", account.email);
            println!("  Balance:         {}", format_cents(account.balance));
            println!("  Opening balance: {}", format_cents(account.opening_balance));
            println!(
                "  Created:         {}",
                account.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(())
}

pub(crate) fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts found.");
        return;
    }
    println!("{:<6} {:<20} {:<28} {:>12}", "ID", "NAME", "EMAIL", "BALANCE");
    println!("{}", "-".repeat(69));
    for account in accounts {
        println!(
            "{:<6} {:<20} {:<28} {:>12}",
            account.id,
            account.name,
            account.email,
            format_cents(account.balance)
        );
    }
}

async fn run_transfers_command(service: &LedgerService) -> Result<()> {
    let transfers = service.list_transfers().await?;
    if transfers.is_empty() {
        println!("No transfers found.");
        return Ok(());
    }

    println!("{:<6} {:<20} {:>6} {:>6} {:>12}", "ID", "DATE", "FROM", "TO", "AMOUNT");
    println!("{}", "-".repeat(54));
    for t in transfers {
        println!(
            "{:<6} {:<20} {:>6} {:>6} {:>12}",
            t.id,
            t.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            t.from_account,
            t.to_account,
            format_cents(t.amount_cents)
        );
    }
    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Accounts:  {}", report.account_count);
    println!("Transfers: {}", report.transfer_count);
    println!();
    println!("  {:<16} {:>12}", "Opening total:", format_cents(report.total_opening_balance));
    println!(
        "  {:<16} {:>12}  {}",
        "Current total:",
        format_cents(report.total_balance),
        if report.is_balanced { "OK" } else { "UNBALANCED!" }
    );
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}
