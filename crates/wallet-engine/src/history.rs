//! Sent/received classification of provider transaction history.

use serde::{Deserialize, Serialize};

use crate::provider::ChainTransaction;

/// Direction of value flow relative to the wallet address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxDirection {
    Sent,
    Received,
}

/// One confirmed transaction as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub txid: String,
    /// Block time, UNIX seconds.
    pub timestamp: u64,
    pub direction: TxDirection,
    pub amount_sat: u64,
}

/// Classify each confirmed transaction as sent or received and compute its
/// net amount relative to `address`, preserving provider order.
///
/// A transaction counts as sent when any of its inputs spends an output that
/// paid the wallet. Sent amounts exclude outputs paying the wallet back
/// (change), and received amounts include only outputs paying the wallet:
/// both measure external movement, not gross output value. Transactions
/// without a block time are dropped.
pub fn reconstruct(address: &str, txs: &[ChainTransaction]) -> Vec<HistoryItem> {
    txs.iter()
        .filter_map(|tx| {
            let timestamp = tx.status.block_time?;

            let is_sent = tx.vin.iter().any(|vin| {
                vin.prevout
                    .as_ref()
                    .and_then(|prev| prev.scriptpubkey_address.as_deref())
                    == Some(address)
            });

            let amount_sat: u64 = if is_sent {
                tx.vout
                    .iter()
                    .filter(|out| out.scriptpubkey_address.as_deref() != Some(address))
                    .map(|out| out.value)
                    .sum()
            } else {
                tx.vout
                    .iter()
                    .filter(|out| out.scriptpubkey_address.as_deref() == Some(address))
                    .map(|out| out.value)
                    .sum()
            };

            Some(HistoryItem {
                txid: tx.txid.clone(),
                timestamp,
                direction: if is_sent {
                    TxDirection::Sent
                } else {
                    TxDirection::Received
                },
                amount_sat,
            })
        })
        .collect()
}
