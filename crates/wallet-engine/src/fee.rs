//! Fee estimation for legacy P2PKH transactions.

/// Approximate serialized size of one signed P2PKH input (in bytes).
pub const P2PKH_INPUT_BYTES: u64 = 148;

/// Approximate serialized size of one P2PKH output (in bytes).
pub const OUTPUT_BYTES: u64 = 34;

/// Fixed transaction overhead (in bytes): version + locktime + counts.
pub const TX_OVERHEAD_BYTES: u64 = 10;

/// Minimum output value below which an output is uneconomical to create.
pub const DUST_THRESHOLD_SAT: u64 = 546;

/// Default fee rate in satoshis per kilobyte.
pub const DEFAULT_FEE_RATE_PER_KB: u64 = 1000;

/// Estimate the fee for a legacy P2PKH transaction.
///
/// The size model is `148 * inputs + 34 * outputs + 10` bytes and the fee is
/// `size * fee_rate_per_kb / 1000`, truncating. This is a heuristic: actual
/// signature lengths vary by a byte or two per input and are not accounted
/// for.
pub fn estimate_fee(num_inputs: usize, num_outputs: usize, fee_rate_per_kb: u64) -> u64 {
    let size = TX_OVERHEAD_BYTES
        + (num_inputs as u64 * P2PKH_INPUT_BYTES)
        + (num_outputs as u64 * OUTPUT_BYTES);
    size * fee_rate_per_kb / 1000
}
