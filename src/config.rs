//! Runtime configuration for the ledger.
//!
//! Defaults match a small service: ten pooled connections, five kept warm,
//! connections recycled every five minutes.

use std::time::Duration;

/// Connection pool and transfer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// Connections older than this are closed and replaced
    pub max_lifetime: Duration,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
    /// How long SQLite waits on a locked database before failing
    pub busy_timeout: Duration,
    /// Deadline applied to a transfer when the caller gives none
    pub transfer_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 5,
            max_lifetime: Duration::from_secs(5 * 60),
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            transfer_timeout: Duration::from_secs(5),
        }
    }
}

impl LedgerConfig {
    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Clamp `min_connections` so it never exceeds `max_connections`.
    pub fn normalized(mut self) -> Self {
        self.max_connections = self.max_connections.max(1);
        self.min_connections = self.min_connections.min(self.max_connections);
        self
    }
}
