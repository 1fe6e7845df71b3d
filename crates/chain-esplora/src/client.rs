use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use wallet_engine::network::Network;
use wallet_engine::provider::{
    AddressStats, ChainDataProvider, ChainTransaction, ProviderError, Utxo,
};

/// Request timeout for all provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for an Esplora-compatible chain-data API.
pub struct EsploraClient {
    http: reqwest::Client,
    base_url: String,
}

impl EsploraClient {
    /// Client for an explicit Esplora base URL (with or without a trailing
    /// slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client pointed at the default endpoint for `network`.
    pub fn for_network(network: Network) -> Result<Self, ProviderError> {
        Self::new(network.esplora_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = self.url(path);
        tracing::debug!(%url, "esplora GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChainDataProvider for EsploraClient {
    async fn utxos(&self, address: &str) -> Result<Vec<Utxo>, ProviderError> {
        self.get_json(&format!("address/{address}/utxo")).await
    }

    async fn address_stats(&self, address: &str) -> Result<AddressStats, ProviderError> {
        self.get_json(&format!("address/{address}")).await
    }

    async fn transactions(&self, address: &str) -> Result<Vec<ChainTransaction>, ProviderError> {
        self.get_json(&format!("address/{address}/txs")).await
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<String, ProviderError> {
        let url = self.url("tx");
        tracing::debug!(%url, bytes = tx_hex.len() / 2, "esplora POST tx");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "text/plain")
            .body(tx_hex.to_string())
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %body, "esplora rejected broadcast");
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let client = EsploraClient::new("https://mempool.space/signet/api").unwrap();
        assert_eq!(
            client.url("address/tb1q/utxo"),
            "https://mempool.space/signet/api/address/tb1q/utxo"
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = EsploraClient::new("https://blockstream.info/testnet/api/").unwrap();
        assert_eq!(client.base_url(), "https://blockstream.info/testnet/api");
        assert_eq!(client.url("tx"), "https://blockstream.info/testnet/api/tx");
    }

    #[test]
    fn for_network_uses_the_default_endpoints() {
        let signet = EsploraClient::for_network(Network::Signet).unwrap();
        assert_eq!(signet.base_url(), Network::Signet.esplora_url());

        let mainnet = EsploraClient::for_network(Network::Mainnet).unwrap();
        assert_eq!(mainnet.base_url(), Network::Mainnet.esplora_url());
    }
}
