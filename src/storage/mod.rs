/// Column list shared by every query that maps rows with `row_to_account`.
macro_rules! account_columns {
    () => {
        "id, name, email, balance, opening_balance, created_at"
    };
}

mod repository;
mod transaction;

pub use repository::*;
pub use transaction::*;

/// SQL migration for the initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
