//! Orchestration of the provider, UTXO cache, and signing key.

use bitcoin::address::Address;

use crate::balance::WalletBalance;
use crate::error::WalletError;
use crate::history::{self, HistoryItem};
use crate::keys::WalletKey;
use crate::network::Network;
use crate::provider::{ChainDataProvider, ProviderError, Utxo};
use crate::transaction::{self, SignedTransaction};
use crate::utxo::UtxoCache;

/// The wallet engine: one address, one key, one provider.
///
/// The engine performs no internal locking. It expects a single caller to
/// drive it sequentially (build, sign, broadcast); concurrent sends against
/// the same cached UTXO set risk double-spend attempts and must be
/// serialized outside, as [`crate::service::WalletService`] does.
pub struct WalletEngine<P, K> {
    provider: P,
    key: K,
    network: Network,
    cache: UtxoCache,
}

impl<P, K> WalletEngine<P, K>
where
    P: ChainDataProvider,
    K: WalletKey,
{
    pub fn new(provider: P, key: K, network: Network) -> Self {
        Self {
            provider,
            key,
            network,
            cache: UtxoCache::new(),
        }
    }

    /// The wallet's receive address.
    pub fn address(&self) -> &Address {
        self.key.address()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The cached UTXO set, without a network call.
    pub fn cached_utxos(&self) -> &[Utxo] {
        self.cache.get()
    }

    /// Replace the UTXO cache with the provider's current view.
    pub async fn refresh_utxos(&mut self) -> Result<(), WalletError> {
        let address = self.key.address().to_string();
        let utxos = self.provider.utxos(&address).await?;
        tracing::debug!(count = utxos.len(), "refreshed utxo set");
        self.cache.replace(utxos);
        Ok(())
    }

    /// Cached UTXOs, refreshing lazily when the cache is empty.
    pub async fn spendable_utxos(&mut self) -> Result<&[Utxo], WalletError> {
        if self.cache.is_empty() {
            self.refresh_utxos().await?;
        }
        Ok(self.cache.get())
    }

    /// Current confirmed and pending balance.
    ///
    /// Provider failures yield [`WalletBalance::FETCH_FAILED`] instead of an
    /// error. A successful fetch also refreshes the UTXO cache so the next
    /// send starts from a current view.
    pub async fn balance(&mut self) -> WalletBalance {
        let address = self.key.address().to_string();

        let stats = match self.provider.address_stats(&address).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "balance fetch failed");
                return WalletBalance::FETCH_FAILED;
            }
        };

        match self.provider.utxos(&address).await {
            Ok(utxos) => self.cache.replace(utxos),
            Err(e) => {
                tracing::warn!(error = %e, "utxo refresh failed");
                return WalletBalance::FETCH_FAILED;
            }
        }

        WalletBalance::from_stats(&stats)
    }

    /// Build and sign a payment of `amount_sat` to `destination`, spending
    /// the cached UTXO set. Change returns to the wallet's own address.
    pub async fn create_transaction(
        &mut self,
        destination: &str,
        amount_sat: u64,
        fee_rate_per_kb: u64,
    ) -> Result<SignedTransaction, WalletError> {
        self.spendable_utxos().await?;

        tracing::debug!(
            available = self.cache.get().len(),
            amount_sat,
            fee_rate_per_kb,
            "building transaction"
        );

        let draft = transaction::build_transaction(
            self.cache.get(),
            destination,
            amount_sat,
            self.key.address(),
            fee_rate_per_kb,
            self.network,
        )?;

        transaction::sign_transaction(&draft, &self.key)
    }

    /// Serialize and submit a signed transaction.
    ///
    /// On success the UTXO cache is invalidated (its outputs are spent) and
    /// the provider's acknowledgement body is returned. HTTP 400 maps to
    /// [`WalletError::InvalidTransaction`]; any other failure is surfaced
    /// verbatim. The cache is left untouched on failure.
    pub async fn broadcast(&mut self, signed: &SignedTransaction) -> Result<String, WalletError> {
        let hex = signed.raw_hex();
        tracing::debug!(txid = %signed.txid(), bytes = hex.len() / 2, "broadcasting transaction");

        match self.provider.broadcast(&hex).await {
            Ok(body) => {
                self.cache.invalidate();
                tracing::info!(txid = %signed.txid(), "transaction accepted by provider");
                Ok(body.trim().to_string())
            }
            Err(ProviderError::Http { status: 400, body }) => {
                tracing::warn!(%body, "provider rejected transaction");
                Err(WalletError::InvalidTransaction(body))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reconstructed transaction history for the wallet address.
    pub async fn history(&self) -> Result<Vec<HistoryItem>, WalletError> {
        let address = self.key.address().to_string();
        let txs = self.provider.transactions(&address).await?;
        tracing::debug!(count = txs.len(), "fetched transactions");
        Ok(history::reconstruct(&address, &txs))
    }
}
