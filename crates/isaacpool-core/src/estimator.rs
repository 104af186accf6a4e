//! Byte-stream entropy estimation via average Hamming weight.
//!
//! The metric is deliberately cheap: the mean probability of a set bit per
//! byte, computed through a 256-entry lookup table. A stream of zeros scores
//! 0.0, a stream of `0xFF` scores 1.0, and uniform random data hovers at 0.5.
//! It only detects first-order bias — that is the contract, not a bug.

/// Admission threshold on the mean bit-occurrence probability. A source's
/// sample mean must exceed this; hash-split slices are rejected only
/// strictly below it.
pub const ENTROPY_THRESHOLD: f64 = 0.25;

/// Precomputed `popcount(b) / 8` for every byte value, giving O(1)
/// per-byte evaluation.
pub const BYTE_BIT_PROBS: [f64; 256] = {
    let mut table = [0.0_f64; 256];
    let mut value = 0usize;
    while value < 256 {
        table[value] = (value as u8).count_ones() as f64 / 8.0;
        value += 1;
    }
    table
};

/// Mean bit-occurrence probability of a byte slice, in `[0, 1]`.
///
/// Returns 0.0 for an empty slice.
pub fn bit_prob_mean(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let sum: f64 = bytes.iter().map(|&b| BYTE_BIT_PROBS[b as usize]).sum();
    sum / bytes.len() as f64
}
