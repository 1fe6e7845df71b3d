//! Confirmed and pending balance derived from address statistics.

use serde::{Deserialize, Serialize};

use crate::provider::AddressStats;

/// Snapshot of the wallet balance in satoshis.
///
/// `confirmed == -1` is a sentinel meaning the fetch failed; it is never a
/// real balance. Callers render it as an error state instead of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub confirmed: i64,
    pub pending: i64,
}

impl WalletBalance {
    /// Sentinel returned when the provider could not be reached.
    pub const FETCH_FAILED: WalletBalance = WalletBalance {
        confirmed: -1,
        pending: 0,
    };

    /// Whether this snapshot is the fetch-failure sentinel.
    pub fn is_fetch_failed(&self) -> bool {
        self.confirmed < 0
    }

    /// Derive the balance from provider statistics: funded minus spent, per
    /// scope.
    pub fn from_stats(stats: &AddressStats) -> Self {
        WalletBalance {
            confirmed: stats.chain_stats.balance(),
            pending: stats.mempool_stats.balance(),
        }
    }
}
