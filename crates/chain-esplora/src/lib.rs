//! Esplora-backed chain-data provider.
//!
//! Implements the wallet engine's provider contract against any
//! Esplora-compatible HTTP API (blockstream.info, mempool.space).

mod client;

pub use client::EsploraClient;
