//! Caller-facing wallet service: destination policy, send serialization,
//! and periodic refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::balance::WalletBalance;
use crate::engine::WalletEngine;
use crate::error::WalletError;
use crate::fee;
use crate::history::HistoryItem;
use crate::keys::WalletKey;
use crate::network::Network;
use crate::provider::ChainDataProvider;

/// Outcome of a successful send: the locally computed transaction id plus
/// the provider's acknowledgement body.
///
/// Failures come back as [`WalletError`] values, so callers branch on the
/// `Result` instead of parsing tagged strings.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub txid: String,
    pub provider_ack: String,
}

/// Live snapshots published by the refresh task.
///
/// `balance` starts as `None` until the first fetch completes.
pub struct WalletUpdates {
    pub balance: watch::Receiver<Option<WalletBalance>>,
    pub history: watch::Receiver<Vec<HistoryItem>>,
}

/// Wraps the engine with the discipline its contract expects of callers: a
/// destination allow-list, a positive-amount check, and a single-flight
/// lock held across build, sign, and broadcast so two sends can never race
/// one cached UTXO set.
pub struct WalletService<P, K> {
    engine: Arc<Mutex<WalletEngine<P, K>>>,
    network: Network,
}

impl<P, K> WalletService<P, K>
where
    P: ChainDataProvider + 'static,
    K: WalletKey + 'static,
{
    pub fn new(engine: WalletEngine<P, K>) -> Self {
        let network = engine.network();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            network,
        }
    }

    /// The wallet's receive address, as a string for display.
    pub async fn address(&self) -> String {
        self.engine.lock().await.address().to_string()
    }

    /// Current balance snapshot; the fetch-failed sentinel on provider
    /// errors.
    pub async fn balance(&self) -> WalletBalance {
        self.engine.lock().await.balance().await
    }

    /// Reconstructed transaction history.
    pub async fn history(&self) -> Result<Vec<HistoryItem>, WalletError> {
        self.engine.lock().await.history().await
    }

    /// [`WalletService::send`] with the default fee rate of 1000 sat/kB.
    pub async fn send_with_default_fee(
        &self,
        destination: &str,
        amount_sat: u64,
    ) -> Result<SendReceipt, WalletError> {
        self.send(destination, amount_sat, fee::DEFAULT_FEE_RATE_PER_KB)
            .await
    }

    /// Build, sign, and broadcast a payment while holding the engine lock
    /// for the whole flow.
    ///
    /// Whitespace in the destination is stripped before validation, and
    /// address formats outside the network's allow-list are rejected before
    /// the engine sees them.
    pub async fn send(
        &self,
        destination: &str,
        amount_sat: u64,
        fee_rate_per_kb: u64,
    ) -> Result<SendReceipt, WalletError> {
        let destination: String = destination.split_whitespace().collect();
        self.check_destination(&destination)?;

        if amount_sat == 0 {
            return Err(WalletError::TransactionBuild(
                "amount must be positive".into(),
            ));
        }

        let mut engine = self.engine.lock().await;
        let signed = engine
            .create_transaction(&destination, amount_sat, fee_rate_per_kb)
            .await?;
        let provider_ack = engine.broadcast(&signed).await?;

        Ok(SendReceipt {
            txid: signed.txid().to_string(),
            provider_ack,
        })
    }

    /// Spawn a periodic refresh of balance and history.
    ///
    /// Snapshots are published on watch channels. The task is cancellable:
    /// abort the returned handle, or drop all receivers and it stops on its
    /// next tick.
    pub fn spawn_refresh_task(&self, interval: Duration) -> (WalletUpdates, JoinHandle<()>) {
        let engine = Arc::clone(&self.engine);
        let (balance_tx, balance_rx) = watch::channel(None);
        let (history_tx, history_rx) = watch::channel(Vec::new());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let mut engine = engine.lock().await;
                let balance = engine.balance().await;
                if balance_tx.send(Some(balance)).is_err() {
                    tracing::debug!("all balance receivers gone, stopping refresh task");
                    break;
                }

                match engine.history().await {
                    Ok(items) => {
                        if history_tx.send(items).is_err() {
                            tracing::debug!("all history receivers gone, stopping refresh task");
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "history refresh failed"),
                }
            }
        });

        (
            WalletUpdates {
                balance: balance_rx,
                history: history_rx,
            },
            handle,
        )
    }

    /// Reject destination formats outside the allow-list for the active
    /// network before the engine ever sees them.
    fn check_destination(&self, destination: &str) -> Result<(), WalletError> {
        let allowed: &[&str] = match self.network {
            Network::Mainnet => &["1", "bc1q"],
            Network::Testnet | Network::Signet => &["m", "n", "tb1q"],
        };

        if allowed.iter().any(|prefix| destination.starts_with(prefix)) {
            Ok(())
        } else {
            Err(WalletError::UnsupportedDestination(destination.to_string()))
        }
    }
}
