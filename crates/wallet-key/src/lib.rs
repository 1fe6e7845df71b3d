//! Deterministic single-key wallet context.
//!
//! Loads or creates a BIP-39 mnemonic file, derives one BIP-44 key for the
//! configured network, and exposes the P2PKH receive address plus a sighash
//! signing capability to the wallet engine.

use std::fs;
use std::path::Path;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use bitcoin::address::Address;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroize;

use wallet_engine::keys::WalletKey;
use wallet_engine::network::Network;

/// Key loading and derivation errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("wallet file error: {0}")]
    Storage(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Owned handle over the wallet's single deterministic key.
///
/// Construction is the only fallible step; once a context exists, signing
/// cannot fail. The receive address is re-derived from the mnemonic on
/// every load, so nothing besides the mnemonic file is persisted.
pub struct WalletContext {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl WalletContext {
    /// Load the mnemonic from `path`, creating and persisting a fresh one on
    /// first run, then derive the wallet key for `network`.
    pub fn load_or_create(path: &Path, network: Network) -> Result<Self, KeyError> {
        let phrase = if path.exists() {
            fs::read_to_string(path).map_err(|e| KeyError::Storage(e.to_string()))?
        } else {
            let phrase = generate_mnemonic()?;
            fs::write(path, &phrase).map_err(|e| KeyError::Storage(e.to_string()))?;
            tracing::info!(path = %path.display(), "created new wallet key file");
            phrase
        };

        Self::from_mnemonic(phrase.trim(), network)
    }

    /// Derive the wallet key from an existing mnemonic phrase.
    pub fn from_mnemonic(phrase: &str, network: Network) -> Result<Self, KeyError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        let mut seed = mnemonic.to_seed("");

        let coin_type = match network {
            Network::Mainnet => 0,
            Network::Testnet | Network::Signet => 1,
        };
        let path: DerivationPath = format!("m/44'/{coin_type}'/0'/0/0")
            .parse()
            .map_err(|e: bip32::Error| KeyError::Derivation(e.to_string()))?;

        let xprv = XPrv::derive_from_path(&seed, &path)
            .map_err(|e| KeyError::Derivation(e.to_string()))?;
        seed.zeroize();

        let mut key_bytes: [u8; 32] = xprv.to_bytes().into();
        let secret_key = SecretKey::from_slice(&key_bytes)
            .map_err(|e| KeyError::Derivation(e.to_string()))?;
        key_bytes.zeroize();

        let secp = Secp256k1::new();
        let public_key = secret_key.public_key(&secp);
        let address = Address::p2pkh(
            &bitcoin::PublicKey::new(public_key),
            network.to_bitcoin_network(),
        );

        Ok(Self {
            secp,
            secret_key,
            public_key,
            address,
        })
    }
}

impl WalletKey for WalletContext {
    fn address(&self) -> &Address {
        &self.address
    }

    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign_hash(&self, sighash: [u8; 32]) -> Signature {
        self.secp
            .sign_ecdsa(&Message::from_digest(sighash), &self.secret_key)
    }
}

/// Generate a new 24-word BIP-39 mnemonic (256 bits of entropy).
fn generate_mnemonic() -> Result<String, KeyError> {
    let mut entropy = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
    entropy.zeroize();
    Ok(mnemonic.to_string())
}
