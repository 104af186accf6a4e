//! Seed assembly: split cryptographic hashing of admitted entropy.
//!
//! Admitted source bytes are partitioned across [`N_SPLITS`] independent
//! SHA3-512 contexts. Each source must clear the per-sample estimate gate,
//! and each split slice must clear the Hamming-weight gate, before any
//! hash is updated — a single failure aborts the whole seeding. Finalizing
//! turns the rolling hashes into digests, from which seed words are emitted
//! by MSB-first grouping.

use sha3::{Digest, Sha3_512};

use crate::error::{Error, Result};
use crate::estimator::{bit_prob_mean, ENTROPY_THRESHOLD};
use crate::source::EntropySource;

/// Number of independent hash splits in the canonical configuration.
pub const N_SPLITS: usize = 16;

/// SHA3-512 digest length.
pub const DIGEST_BYTES: usize = 64;

/// A seed word type: an unsigned integer built from digest bytes MSB-first.
///
/// Implemented for `u16`, `u32` and `u64`; the power-of-two size
/// requirement on seed terms holds by construction.
pub trait SeedWord: Copy + Default {
    const BYTES: usize;

    /// `word = (word << 8) | byte`.
    fn fold_byte(self, byte: u8) -> Self;
}

macro_rules! impl_seed_word {
    ($($ty:ty),*) => {
        $(impl SeedWord for $ty {
            const BYTES: usize = std::mem::size_of::<$ty>();

            fn fold_byte(self, byte: u8) -> Self {
                (self << 8) | byte as $ty
            }
        })*
    };
}

impl_seed_word!(u16, u32, u64);

/// Split-hash seed assembler.
pub struct SeedAssembler {
    hashers: Vec<Sha3_512>,
    digests: Vec<[u8; DIGEST_BYTES]>,
    splits: usize,
    ready: bool,
}

impl SeedAssembler {
    /// Create an assembler with `splits` independent hash contexts.
    pub fn new(splits: usize) -> Self {
        assert!(splits > 0, "at least one hash split is required");
        Self {
            hashers: (0..splits).map(|_| Sha3_512::new()).collect(),
            digests: vec![[0u8; DIGEST_BYTES]; splits],
            splits,
            ready: false,
        }
    }

    /// Gate, drain, and fold one source into the rolling hashes.
    ///
    /// The source's mean per-bit probability must exceed the
    /// [`ENTROPY_THRESHOLD`], and no split slice may fall strictly below
    /// it; otherwise nothing is admitted and the error aborts seeding.
    /// Returns the number of bytes admitted.
    pub fn consume(&mut self, source: &mut dyn EntropySource) -> Result<usize> {
        if self.ready {
            return Err(Error::SeedState("finalized seed pending; copy or reset first"));
        }

        let probs = source.bit_entropy();
        let mean = if probs.is_empty() {
            0.0
        } else {
            probs.iter().sum::<f64>() / probs.len() as f64
        };
        // The source gate is strict: a mean of exactly 0.25 fails here,
        // while slices below only fail strictly under the threshold.
        if mean <= ENTROPY_THRESHOLD {
            log::debug!("source {} rejected: sample estimate {mean:.4}", source.name());
            return Err(Error::InsufficientEntropy("sample estimate below threshold"));
        }

        let mut data = Vec::new();
        source.drain(&mut data);
        if data.len() < self.splits {
            return Err(Error::InsufficientEntropy("window smaller than split count"));
        }

        let step = data.len() / self.splits;
        for i in 0..self.splits {
            let start = i * step;
            // The last slice absorbs the remainder.
            let end = if i == self.splits - 1 { data.len() } else { start + step };
            let slice = &data[start..end];
            if bit_prob_mean(slice) < ENTROPY_THRESHOLD {
                log::debug!("source {} rejected: split {i} below threshold", source.name());
                return Err(Error::InsufficientEntropy("split estimate below threshold"));
            }
            self.hashers[i].update(slice);
        }

        log::debug!("source {} admitted {} bytes", source.name(), data.len());
        Ok(data.len())
    }

    /// Finalize every rolling hash into its digest. Idempotent; after this,
    /// no more data is accepted until the seed is copied out or reset.
    pub fn finalize(&mut self) {
        if self.ready {
            return;
        }
        for (hasher, digest) in self.hashers.iter_mut().zip(self.digests.iter_mut()) {
            digest.copy_from_slice(&hasher.finalize_reset());
        }
        self.ready = true;
    }

    /// Whether a finalized seed is available.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Fill `out` with seed words formed by MSB-first grouping of
    /// successive digest bytes, split-major. Requires a finalized seed and
    /// at most `splits * (64 / size_of::<T>())` words. Clears the ready
    /// flag afterwards, enabling reuse.
    pub fn copy_seed<T: SeedWord>(&mut self, out: &mut [T]) -> Result<()> {
        if !self.ready {
            return Err(Error::SeedState("seed has not been finalized"));
        }
        let available = self.splits * (DIGEST_BYTES / T::BYTES);
        if out.len() > available {
            return Err(Error::SeedState("more seed words requested than digest material"));
        }

        let mut bytes = self.digests.iter().flat_map(|d| d.iter().copied());
        for word in out.iter_mut() {
            let mut w = T::default();
            for _ in 0..T::BYTES {
                // Cannot run dry: out.len() was checked against available.
                w = w.fold_byte(bytes.next().unwrap_or(0));
            }
            *word = w;
        }

        self.ready = false;
        Ok(())
    }

    /// Discard a finalized seed without copying it.
    pub fn reset(&mut self) {
        self.ready = false;
    }
}
