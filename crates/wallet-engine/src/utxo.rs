//! UTXO cache and input selection.

use crate::error::WalletError;
use crate::fee;
use crate::provider::Utxo;

/// Last-fetched UTXO set for the wallet address.
///
/// The set is replaced wholesale on refresh (last write wins) and cleared
/// after a successful broadcast so spent outputs are not offered to the
/// builder again. An empty cache and a never-filled cache are equivalent:
/// both mean a refresh is needed.
#[derive(Debug, Default)]
pub struct UtxoCache {
    utxos: Vec<Utxo>,
}

impl UtxoCache {
    pub fn new() -> Self {
        Self { utxos: Vec::new() }
    }

    /// Replace the cached set with a fresh provider response.
    pub fn replace(&mut self, utxos: Vec<Utxo>) {
        self.utxos = utxos;
    }

    /// The cached set, in the order the provider returned it.
    pub fn get(&self) -> &[Utxo] {
        &self.utxos
    }

    /// Drop the cached set. Called after a successful broadcast.
    pub fn invalidate(&mut self) {
        self.utxos.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Total value of the cached set in satoshis.
    pub fn total_sat(&self) -> u64 {
        self.utxos.iter().map(|u| u.value).sum()
    }
}

/// Result of input selection: the chosen UTXOs, their aggregate value, and
/// the fee estimated for that input count.
#[derive(Debug, Clone)]
pub struct UtxoSelection {
    pub selected: Vec<Utxo>,
    pub total_sat: u64,
    pub fee_sat: u64,
}

/// Accumulate UTXOs in provider-returned order until they cover
/// `amount_sat` plus the estimated fee for the running input count and two
/// outputs (recipient + change).
///
/// The loop exits at the first sufficient prefix; UTXOs beyond it are left
/// untouched for later spends.
pub fn select_utxos(
    utxos: &[Utxo],
    amount_sat: u64,
    fee_rate_per_kb: u64,
) -> Result<UtxoSelection, WalletError> {
    let mut selected: Vec<Utxo> = Vec::new();
    let mut total_sat: u64 = 0;

    for utxo in utxos {
        selected.push(utxo.clone());
        total_sat += utxo.value;

        let fee_sat = fee::estimate_fee(selected.len(), 2, fee_rate_per_kb);
        if total_sat >= amount_sat + fee_sat {
            return Ok(UtxoSelection {
                selected,
                total_sat,
                fee_sat,
            });
        }
    }

    let fee_sat = fee::estimate_fee(selected.len(), 2, fee_rate_per_kb);
    Err(WalletError::InsufficientFunds {
        have: total_sat,
        need: amount_sat + fee_sat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ConfirmationStatus;

    fn make_utxo(txid: &str, vout: u32, value: u64) -> Utxo {
        Utxo {
            txid: txid.to_string(),
            vout,
            value,
            status: ConfirmationStatus {
                confirmed: true,
                block_height: Some(100),
                block_hash: None,
                block_time: Some(1_700_000_000),
            },
        }
    }

    #[test]
    fn selects_first_sufficient_prefix() {
        let utxos = vec![
            make_utxo("aaaa", 0, 5_000),
            make_utxo("bbbb", 0, 50_000),
        ];
        // amount 1000 at 1000 sat/kB: one input covers 1000 + 226.
        let selection = select_utxos(&utxos, 1_000, 1000).unwrap();
        assert_eq!(selection.selected.len(), 1);
        assert_eq!(selection.selected[0].txid, "aaaa");
        assert_eq!(selection.total_sat, 5_000);
        assert_eq!(selection.fee_sat, 226);
    }

    #[test]
    fn accumulates_in_provider_order() {
        let utxos = vec![
            make_utxo("small", 0, 1_000),
            make_utxo("large", 0, 100_000),
            make_utxo("medium", 0, 50_000),
        ];
        let selection = select_utxos(&utxos, 40_000, 1000).unwrap();
        // Provider order, not largest-first: the small one is pulled in too.
        assert_eq!(selection.selected.len(), 2);
        assert_eq!(selection.selected[0].txid, "small");
        assert_eq!(selection.selected[1].txid, "large");
    }

    #[test]
    fn stops_once_threshold_is_met() {
        let utxos = vec![
            make_utxo("aaaa", 0, 30_000),
            make_utxo("bbbb", 0, 30_000),
            make_utxo("cccc", 0, 30_000),
        ];
        let selection = select_utxos(&utxos, 25_000, 1000).unwrap();
        assert_eq!(selection.selected.len(), 1);
    }

    #[test]
    fn fee_is_recomputed_per_input_count() {
        let utxos = vec![
            make_utxo("aaaa", 0, 30_000),
            make_utxo("bbbb", 0, 30_000),
        ];
        let selection = select_utxos(&utxos, 35_000, 1000).unwrap();
        assert_eq!(selection.selected.len(), 2);
        // 2 inputs, 2 outputs: 2*148 + 68 + 10 = 374 bytes.
        assert_eq!(selection.fee_sat, 374);
        assert!(selection.total_sat >= 35_000 + selection.fee_sat);
    }

    #[test]
    fn insufficient_funds_reports_have_and_need() {
        let utxos = vec![make_utxo("aaaa", 0, 500)];
        let err = select_utxos(&utxos, 1_000, 1000).unwrap_err();
        match err {
            WalletError::InsufficientFunds { have, need } => {
                assert_eq!(have, 500);
                assert_eq!(need, 1_000 + 226);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn empty_utxo_set_is_insufficient() {
        let err = select_utxos(&[], 1_000, 1000).unwrap_err();
        assert!(matches!(err, WalletError::InsufficientFunds { have: 0, .. }));
    }

    #[test]
    fn cache_replace_and_invalidate() {
        let mut cache = UtxoCache::new();
        assert!(cache.is_empty());

        cache.replace(vec![make_utxo("aaaa", 0, 7_000), make_utxo("bbbb", 1, 3_000)]);
        assert!(!cache.is_empty());
        assert_eq!(cache.get().len(), 2);
        assert_eq!(cache.total_sat(), 10_000);

        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.total_sat(), 0);
    }

    #[test]
    fn cache_last_write_wins() {
        let mut cache = UtxoCache::new();
        cache.replace(vec![make_utxo("old", 0, 1_000)]);
        cache.replace(vec![make_utxo("new", 0, 2_000)]);
        assert_eq!(cache.get().len(), 1);
        assert_eq!(cache.get()[0].txid, "new");
    }
}
