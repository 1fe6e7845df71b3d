//! Legacy P2PKH transaction construction and signing.

use bitcoin::absolute::LockTime;
use bitcoin::address::Address;
use bitcoin::consensus;
use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, ScriptBuf};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::error::WalletError;
use crate::fee;
use crate::keys::WalletKey;
use crate::network::Network;
use crate::provider::Utxo;
use crate::utxo;

/// An unsigned transaction plus the selection context used to build it.
///
/// Built once per create call and handed straight to signing; never
/// persisted.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// The transaction with empty input scripts.
    pub tx: Transaction,
    /// The UTXOs being spent, in input order.
    pub selected: Vec<Utxo>,
    /// The fee the builder budgeted, in satoshis.
    pub fee_sat: u64,
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx: Transaction,
}

impl SignedTransaction {
    /// Canonical byte encoding.
    pub fn serialize(&self) -> Vec<u8> {
        consensus::serialize(&self.tx)
    }

    /// Lowercase hex of the canonical encoding, as submitted to a provider.
    pub fn raw_hex(&self) -> String {
        consensus::encode::serialize_hex(&self.tx)
    }

    /// Transaction id: double-SHA256 of the serialized form.
    pub fn txid(&self) -> Txid {
        self.tx.compute_txid()
    }
}

/// Build an unsigned legacy transaction paying `amount_sat` to `destination`.
///
/// Inputs are accumulated from `utxos` in the order given until they cover
/// amount plus fee. A change output back to `change_address` is added when
/// the change exceeds the dust threshold (546 sat); sub-dust change is
/// forfeited to the fee.
pub fn build_transaction(
    utxos: &[Utxo],
    destination: &str,
    amount_sat: u64,
    change_address: &Address,
    fee_rate_per_kb: u64,
    network: Network,
) -> Result<TransactionDraft, WalletError> {
    let destination_addr: Address = destination
        .parse::<Address<bitcoin::address::NetworkUnchecked>>()
        .map_err(|e| WalletError::InvalidAddress(format!("invalid destination address: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| WalletError::InvalidAddress(format!("destination address wrong network: {e}")))?;

    let selection = utxo::select_utxos(utxos, amount_sat, fee_rate_per_kb)?;

    let mut inputs = Vec::with_capacity(selection.selected.len());
    for utxo in &selection.selected {
        let txid: Txid = utxo
            .txid
            .parse()
            .map_err(|e| WalletError::TransactionBuild(format!("invalid txid in utxo set: {e}")))?;

        inputs.push(TxIn {
            previous_output: OutPoint::new(txid, utxo.vout),
            script_sig: ScriptBuf::new(), // filled in by signing
            sequence: Sequence::MAX,
            witness: Witness::default(),
        });
    }

    let mut outputs = vec![TxOut {
        value: Amount::from_sat(amount_sat),
        script_pubkey: destination_addr.script_pubkey(),
    }];

    let change_sat = selection.total_sat - amount_sat - selection.fee_sat;
    if change_sat > fee::DUST_THRESHOLD_SAT {
        outputs.push(TxOut {
            value: Amount::from_sat(change_sat),
            script_pubkey: change_address.script_pubkey(),
        });
    } else if change_sat > 0 {
        tracing::debug!(change_sat, "sub-dust change forfeited to fee");
    }

    let tx = Transaction {
        version: Version::ONE,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: outputs,
    };

    Ok(TransactionDraft {
        tx,
        selected: selection.selected,
        fee_sat: selection.fee_sat,
    })
}

/// Sign every input of the draft with the wallet key.
///
/// All inputs are assumed to spend P2PKH outputs locked to the wallet's own
/// address; the engine trusts its cached UTXO set instead of fetching each
/// referenced output script. That holds only while the wallet is
/// single-address and single-script-type.
pub fn sign_transaction<K: WalletKey>(
    draft: &TransactionDraft,
    key: &K,
) -> Result<SignedTransaction, WalletError> {
    let script_pubkey = key.address().script_pubkey();
    let public_key = bitcoin::PublicKey::new(key.public_key());

    let mut signed_tx = draft.tx.clone();
    let cache = SighashCache::new(&draft.tx);

    for input_index in 0..signed_tx.input.len() {
        let sighash = cache
            .legacy_signature_hash(input_index, &script_pubkey, EcdsaSighashType::All.to_u32())
            .map_err(|e| WalletError::Signing(format!("sighash computation failed: {e}")))?;

        let signature = bitcoin::ecdsa::Signature {
            signature: key.sign_hash(sighash.to_byte_array()),
            sighash_type: EcdsaSighashType::All,
        };

        // Standard P2PKH unlocking script: <signature> <pubkey>.
        signed_tx.input[input_index].script_sig = Builder::new()
            .push_slice(signature.serialize())
            .push_key(&public_key)
            .into_script();
    }

    Ok(SignedTransaction { tx: signed_tx })
}
