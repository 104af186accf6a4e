//! Top-level random pool: lifecycle, entropy scheduling, and block output.
//!
//! A [`RandomPool`] exclusively owns one [`IsaacEngine`]. Output only flows
//! after a successful seeding (fresh entropy through the full admission
//! pipeline) or a successful state restore. Raw generator words never reach
//! the caller: every 128-word batch is whitened through SHA3-256 before a
//! byte is handed out.

use serde::Serialize;
use sha3::{Digest, Sha3_256};

use crate::error::{Error, Result};
use crate::isaac::{IsaacEngine, N};
use crate::seed::{SeedAssembler, N_SPLITS};
use crate::source::EntropySource;
use crate::sources::OsRandomSource;

#[cfg(feature = "camera")]
use crate::sources::CameraSource;
#[cfg(feature = "microphone")]
use crate::sources::MicrophoneSource;

/// Seed length fed to the engine, in 32-bit words.
pub const SEED_TERMS: usize = N;

/// Generator outputs discarded right after seeding, before the first byte
/// is delivered to any caller.
pub const BURN: usize = 512;

/// Base number of bytes requested from the OS source (scaled by the
/// multiplier and the compensation exponent).
pub const OS_BYTES_BASE: usize = 25 * 1024 * 1024;

/// Base number of camera frames (scaled by the multiplier).
pub const CAMERA_FRAMES_BASE: usize = 15;

/// Microphone capture window in milliseconds (not scaled).
pub const MIC_WINDOW_MS: usize = 1000;

/// Generator words pulled per output hash block.
const WORDS_PER_HASH: usize = 128;

/// Outcome of probing a state file, for callers deciding between restore
/// and fresh seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// State was restored (or already matched the request).
    Success,
    /// No state file at the given path; seed before generating.
    FileNotFound,
    /// The file exists but did not authenticate under the supplied key.
    DecryptionError,
    /// The file decoded but the generator could not be initialized from it.
    RngInitError,
}

/// Coarse label for the physical entropy available at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weak => write!(f, "WEAK"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Strong => write!(f, "STRONG"),
        }
    }
}

/// Per-source admission record from the most recent successful seeding.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSeedReport {
    /// Source name.
    pub name: String,
    /// Raw bytes admitted into the seed pipeline.
    pub bytes: usize,
    /// Per-bit-position occurrence probabilities at admission time.
    pub bit_probabilities: Vec<f64>,
    /// Mean of the probability vector (the gated quantity).
    pub mean_bit_probability: f64,
}

/// Admission summary for one seeding round.
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub sources: Vec<SourceSeedReport>,
}

/// Orchestrator over one ISAAC engine: seeding, persistence, output.
#[derive(Default)]
pub struct RandomPool {
    engine: IsaacEngine,
    last_summary: Option<SeedSummary>,
}

impl RandomPool {
    pub fn new() -> Self {
        Self {
            engine: IsaacEngine::new(),
            last_summary: None,
        }
    }

    /// Probe (and, on success, restore) generator state from a file.
    pub fn is_initialized(&mut self, path: &str, key: &[u8]) -> LoadStatus {
        match self.engine.initialize(path, key) {
            Ok(()) => LoadStatus::Success,
            Err(Error::FileNotFound(_)) => LoadStatus::FileNotFound,
            Err(Error::Decryption) | Err(Error::InvalidKeyLength(_)) => LoadStatus::DecryptionError,
            Err(_) => LoadStatus::RngInitError,
        }
    }

    /// Seed from the compiled-in source schedule.
    ///
    /// Destroys any current state (saving it first), binds the new state
    /// file and key, mines entropy per the schedule with the given
    /// `multiplier` exponent, and seeds the engine. On any device or
    /// admission failure the engine is left uninitialized.
    pub fn initialize(&mut self, path: &str, multiplier: u32, key: &[u8]) -> Result<()> {
        self.engine.destroy();
        self.engine.set_identifier(path);
        self.engine.set_key(key);
        self.gather_and_seed(multiplier)
    }

    /// Seed from caller-supplied, already-captured sources instead of the
    /// compiled-in schedule. Same lifecycle as
    /// [`initialize`](Self::initialize); this is the seam for embedders
    /// with custom hardware and for tests.
    pub fn initialize_from_sources(
        &mut self,
        path: &str,
        key: &[u8],
        sources: &mut [&mut dyn EntropySource],
    ) -> Result<()> {
        self.engine.destroy();
        self.engine.set_identifier(path);
        self.engine.set_key(key);
        self.seed_from_sources(sources)
    }

    /// Replace the engine's persistence key without reseeding.
    pub fn initialize_encryption(&mut self, key: &[u8]) {
        self.engine.set_key(key);
    }

    /// Persist the current generator state.
    pub fn save_state(&mut self) -> Result<()> {
        self.engine.save()
    }

    /// Save (when initialized) and reset to the uninitialized state.
    /// Idempotent.
    pub fn destroy(&mut self) {
        self.engine.destroy();
    }

    /// Whether the pool can generate output.
    pub fn is_seeded(&self) -> bool {
        self.engine.is_initialized()
    }

    /// Admission summary of the most recent successful seeding.
    pub fn last_seed_summary(&self) -> Option<&SeedSummary> {
        self.last_summary.as_ref()
    }

    /// Fill `out` with whitened generator output.
    ///
    /// Fails with [`Error::NotInitialized`] (writing nothing) before a
    /// successful seeding or restore. Each 32-byte block of output is the
    /// SHA3-256 digest of 128 consecutive generator words serialized
    /// little-endian; the final block is truncated to fit.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<()> {
        if !self.engine.is_initialized() {
            return Err(Error::NotInitialized);
        }

        for chunk in out.chunks_mut(32) {
            let mut block = [0u8; WORDS_PER_HASH * 4];
            for word in 0..WORDS_PER_HASH {
                let w = self.engine.rand();
                block[word * 4..word * 4 + 4].copy_from_slice(&w.to_le_bytes());
            }
            let digest = Sha3_256::digest(block);
            chunk.copy_from_slice(&digest[..chunk.len()]);
        }
        Ok(())
    }

    /// Strength label for the compiled-in source set: both device sources
    /// give `Strong`, one gives `Medium`, the OS alone gives `Weak`.
    pub fn entropy_strength() -> Strength {
        match (cfg!(feature = "microphone"), cfg!(feature = "camera")) {
            (true, true) => Strength::Strong,
            (false, false) => Strength::Weak,
            _ => Strength::Medium,
        }
    }

    /// Capture from every compiled-in source and seed the engine.
    ///
    /// The OS budget compensates for missing device sources: each absent
    /// device raises the exponent by one (both absent: by two). The
    /// microphone window opens first and closes after the synchronous
    /// captures, so its fixed 1000 ms overlaps the other sources.
    fn gather_and_seed(&mut self, multiplier: u32) -> Result<()> {
        #[cfg(feature = "microphone")]
        let mut microphone = {
            let mut microphone = MicrophoneSource::new();
            microphone.start(MIC_WINDOW_MS)?;
            microphone
        };

        #[cfg(feature = "camera")]
        let mut camera = {
            let mut camera = CameraSource::new();
            camera.capture(CAMERA_FRAMES_BASE << multiplier)?;
            camera
        };

        let compensation = match (cfg!(feature = "microphone"), cfg!(feature = "camera")) {
            (true, true) => 0,
            (false, false) => 2,
            _ => 1,
        };
        let mut os = OsRandomSource::new();
        os.capture(OS_BYTES_BASE << (multiplier + compensation))?;

        #[cfg(feature = "microphone")]
        microphone.finish()?;

        let mut sources: Vec<&mut dyn EntropySource> = Vec::new();
        #[cfg(feature = "camera")]
        sources.push(&mut camera);
        sources.push(&mut os);
        #[cfg(feature = "microphone")]
        sources.push(&mut microphone);

        self.seed_from_sources(&mut sources)
    }

    /// Admit every source into a fresh assembler, derive the seed, seed the
    /// engine, and burn the first [`BURN`] outputs.
    fn seed_from_sources(&mut self, sources: &mut [&mut dyn EntropySource]) -> Result<()> {
        let mut assembler = SeedAssembler::new(N_SPLITS);
        let mut reports = Vec::with_capacity(sources.len());

        for source in sources.iter_mut() {
            let bit_probabilities = source.bit_entropy();
            let mean_bit_probability = if bit_probabilities.is_empty() {
                0.0
            } else {
                bit_probabilities.iter().sum::<f64>() / bit_probabilities.len() as f64
            };
            let bytes = assembler.consume(&mut **source)?;
            reports.push(SourceSeedReport {
                name: source.name().to_string(),
                bytes,
                bit_probabilities,
                mean_bit_probability,
            });
        }

        assembler.finalize();
        let mut seed = [0u32; SEED_TERMS];
        assembler.copy_seed(&mut seed)?;
        self.engine.seed(0, 0, 0, Some(&seed));

        for _ in 0..BURN {
            let _ = self.engine.rand();
        }

        log::info!(
            "seeded from {} source(s), burned {BURN} outputs",
            reports.len()
        );
        self.last_summary = Some(SeedSummary { sources: reports });
        Ok(())
    }
}
