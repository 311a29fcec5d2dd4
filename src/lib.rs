pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod storage;

pub use config::LedgerConfig;
pub use domain::*;
pub use storage::Repository;
