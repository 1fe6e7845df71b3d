use thiserror::Error;

use crate::provider::ProviderError;

/// Wallet engine operation errors.
///
/// One tagged enum for the whole send path; balance fetches never surface
/// here because the aggregator converts provider failures into a sentinel
/// value instead.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds: have {have} sat, need {need} sat")]
    InsufficientFunds { have: u64, need: u64 },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The provider rejected the broadcast with HTTP 400. Its response
    /// conflates several validation failures, so the cause cannot be
    /// narrowed further here.
    #[error("insufficient funds or invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("unsupported destination address format: {0}")]
    UnsupportedDestination(String),

    #[error("chain data provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("transaction build error: {0}")]
    TransactionBuild(String),

    #[error("signing error: {0}")]
    Signing(String),
}

impl From<ProviderError> for WalletError {
    fn from(e: ProviderError) -> Self {
        WalletError::ProviderUnavailable(e.to_string())
    }
}
