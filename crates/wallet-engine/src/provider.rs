//! Chain-data provider contract and the wire models it exchanges.
//!
//! The models mirror the Esplora HTTP API's JSON shapes, so a provider
//! implementation can deserialize responses straight into them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors at the provider boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Confirmation status attached to a UTXO or transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationStatus {
    pub confirmed: bool,
    pub block_height: Option<u32>,
    pub block_hash: Option<String>,
    /// UNIX timestamp in seconds; absent while unconfirmed.
    pub block_time: Option<u64>,
}

/// A single unspent transaction output for the wallet address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction ID as a hex string (big-endian / display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// Value in satoshis.
    pub value: u64,
    pub status: ConfirmationStatus,
}

/// Funded/spent output sums for one scope (confirmed chain or mempool).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TxoStats {
    pub funded_txo_sum: u64,
    pub spent_txo_sum: u64,
}

impl TxoStats {
    /// Net balance for this scope: funded minus spent.
    pub fn balance(&self) -> i64 {
        self.funded_txo_sum as i64 - self.spent_txo_sum as i64
    }
}

/// Address-level statistics split by confirmed chain state and mempool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressStats {
    pub address: String,
    pub chain_stats: TxoStats,
    pub mempool_stats: TxoStats,
}

/// One output as seen by the provider, either as a prevout or a vout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    /// Absent for outputs without an address form (e.g. OP_RETURN).
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

/// One input as seen by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    /// The output this input spends; absent for coinbase inputs.
    pub prevout: Option<TxOutput>,
}

/// One transaction touching the wallet address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTransaction {
    pub txid: String,
    pub status: ConfirmationStatus,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

/// Chain-data provider consumed by the wallet engine.
///
/// The engine treats implementations as a black box: it never inspects
/// transport details, and maps [`ProviderError`] values at its own boundary.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Current unspent outputs for `address`.
    async fn utxos(&self, address: &str) -> Result<Vec<Utxo>, ProviderError>;

    /// Funded/spent statistics for `address`, split by chain and mempool scope.
    async fn address_stats(&self, address: &str) -> Result<AddressStats, ProviderError>;

    /// Transactions touching `address`, in the provider's order.
    async fn transactions(&self, address: &str) -> Result<Vec<ChainTransaction>, ProviderError>;

    /// Submit a lowercase-hex raw transaction. Returns the provider's raw
    /// response body (normally the txid).
    async fn broadcast(&self, tx_hex: &str) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utxo_deserializes_from_esplora_json() {
        let json = r#"{
            "txid": "4f9c2e8d0b1a3c5e7f9b2d4a6c8e0f1a3b5d7c9e1f3a5b7d9c1e3f5a7b9d1c3e",
            "vout": 1,
            "value": 50000,
            "status": {
                "confirmed": true,
                "block_height": 193040,
                "block_hash": "00000086d6b2636cb2a392d45edc4ec544a10024d30141c149adf54ba67ce3c5",
                "block_time": 1716805669
            }
        }"#;
        let utxo: Utxo = serde_json::from_str(json).unwrap();
        assert_eq!(utxo.vout, 1);
        assert_eq!(utxo.value, 50_000);
        assert!(utxo.status.confirmed);
        assert_eq!(utxo.status.block_time, Some(1_716_805_669));
    }

    #[test]
    fn unconfirmed_utxo_has_no_block_fields() {
        let json = r#"{
            "txid": "aa",
            "vout": 0,
            "value": 1000,
            "status": { "confirmed": false, "block_height": null, "block_hash": null, "block_time": null }
        }"#;
        let utxo: Utxo = serde_json::from_str(json).unwrap();
        assert!(!utxo.status.confirmed);
        assert!(utxo.status.block_time.is_none());
    }

    #[test]
    fn address_stats_balance_per_scope() {
        let json = r#"{
            "address": "mkpZhYtJu2r87Js3pDiWJDmPte2NRZ8bJV",
            "chain_stats": { "funded_txo_sum": 100000, "spent_txo_sum": 25000 },
            "mempool_stats": { "funded_txo_sum": 5000, "spent_txo_sum": 0 }
        }"#;
        let stats: AddressStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.chain_stats.balance(), 75_000);
        assert_eq!(stats.mempool_stats.balance(), 5_000);
    }

    #[test]
    fn stats_balance_can_go_negative_in_mempool_scope() {
        // A pending spend can exceed pending funding.
        let stats = TxoStats {
            funded_txo_sum: 0,
            spent_txo_sum: 40_000,
        };
        assert_eq!(stats.balance(), -40_000);
    }

    #[test]
    fn transaction_deserializes_with_coinbase_input() {
        let json = r#"{
            "txid": "bb",
            "status": { "confirmed": true, "block_height": 1, "block_hash": "00", "block_time": 1700000000 },
            "vin": [ { "prevout": null } ],
            "vout": [ { "scriptpubkey_address": "mkpZhYtJu2r87Js3pDiWJDmPte2NRZ8bJV", "value": 2500000 } ]
        }"#;
        let tx: ChainTransaction = serde_json::from_str(json).unwrap();
        assert!(tx.vin[0].prevout.is_none());
        assert_eq!(tx.vout[0].value, 2_500_000);
    }

    #[test]
    fn op_return_output_has_no_address() {
        let json = r#"{ "scriptpubkey_address": null, "value": 0 }"#;
        let out: TxOutput = serde_json::from_str(json).unwrap();
        assert!(out.scriptpubkey_address.is_none());
    }
}
