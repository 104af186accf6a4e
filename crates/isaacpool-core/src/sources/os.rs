//! OsRandomSource — the operating system's CSPRNG.
//!
//! The baseline source, always compiled in. Bytes come from the platform
//! generator through `rand_core::OsRng` in bounded chunks; the accumulator
//! tracks per-bit occurrence as they arrive.

use rand_core::{OsRng, RngCore};

use crate::error::{Error, Result};
use crate::source::{EntropySource, SampleAccumulator, SourceInfo};

const CHUNK_BYTES: usize = 64 * 1024;

static OS_RNG_INFO: SourceInfo = SourceInfo {
    name: "os_rng",
    description: "Operating system CSPRNG (getrandom)",
    physics: "The kernel entropy pool, fed by interrupt timing, device \
              noise, and on-CPU hardware generators where present. Already \
              conditioned by the kernel; used here as the baseline source \
              and as compensation when no device source is compiled in.",
    bits_per_sample: 8,
};

/// Entropy source backed by the OS CSPRNG.
pub struct OsRandomSource {
    acc: SampleAccumulator,
}

impl OsRandomSource {
    pub fn new() -> Self {
        Self {
            acc: SampleAccumulator::new(8),
        }
    }
}

impl Default for OsRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for OsRandomSource {
    fn info(&self) -> &SourceInfo {
        &OS_RNG_INFO
    }

    fn capture(&mut self, amount: usize) -> Result<()> {
        let mut remaining = amount;
        let mut chunk = [0u8; CHUNK_BYTES];
        while remaining > 0 {
            let take = remaining.min(CHUNK_BYTES);
            OsRng
                .try_fill_bytes(&mut chunk[..take])
                .map_err(|e| Error::Device(format!("OS generator failed: {e}")))?;
            for &b in &chunk[..take] {
                self.acc.push_byte(b);
            }
            remaining -= take;
        }
        Ok(())
    }

    fn bit_entropy(&self) -> Vec<f64> {
        self.acc.bit_entropy()
    }

    fn drain(&mut self, out: &mut Vec<u8>) {
        self.acc.drain(out);
    }
}
