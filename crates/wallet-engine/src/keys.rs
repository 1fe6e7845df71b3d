//! Key capability required by the signing path.

use bitcoin::address::Address;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::PublicKey;

/// The single deterministic key pair backing the wallet.
///
/// The engine only needs the current receive address, the matching public
/// key, and a way to sign a 32-byte sighash; derivation and persistence are
/// the implementor's concern. Signing itself is infallible: a context that
/// constructed successfully always holds a usable key.
pub trait WalletKey: Send + Sync {
    /// The wallet's P2PKH receive address.
    fn address(&self) -> &Address;

    /// Compressed public key matching [`WalletKey::address`].
    fn public_key(&self) -> PublicKey;

    /// Sign a 32-byte signature hash, returning a compact ECDSA signature.
    fn sign_hash(&self, sighash: [u8; 32]) -> Signature;
}
