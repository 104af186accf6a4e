//! # isaacpool-core
//!
//! **A seeded random pool that refuses to guess.**
//!
//! `isaacpool-core` composes the ISAAC stream generator with an entropy
//! acquisition pipeline and an authenticated persistence layer. The
//! generator never emits a byte until it has been seeded from physical
//! entropy that clears a measurable quality bar, and its state survives
//! process restarts only for a holder of the correct key.
//!
//! ## Quick start
//!
//! ```no_run
//! use isaacpool_core::RandomPool;
//!
//! let mut pool = RandomPool::new();
//!
//! // Mine entropy from every compiled-in source and seed the generator.
//! pool.initialize("./rng-state", 0, &[]).expect("seeding failed");
//!
//! let mut bytes = [0u8; 64];
//! pool.generate(&mut bytes).expect("pool is seeded");
//! ```
//!
//! ## Architecture
//!
//! Sources → admission gate → split SHA3-512 → seed words → ISAAC → SHA3-256 → output
//!
//! Every source implements the [`EntropySource`] trait and carries its own
//! per-bit occurrence estimate. The [`SeedAssembler`] admits source windows
//! only above the [`ENTROPY_THRESHOLD`], folds them across independent hash
//! splits, and derives the 256-word seed. [`RandomPool`] owns the engine,
//! burns the first outputs after seeding, and whitens every output block.
//! [`IsaacEngine`] state round-trips through [`EncryptedBlob`] — plaintext,
//! or AES-256-GCM under a 32-byte key.

pub mod blob;
pub mod error;
pub mod estimator;
pub mod isaac;
pub mod pool;
pub mod seed;
pub mod source;
pub mod sources;

pub use blob::{EncryptedBlob, KEY_BYTES};
pub use error::{Error, Result};
pub use estimator::{bit_prob_mean, BYTE_BIT_PROBS, ENTROPY_THRESHOLD};
pub use isaac::{normalize_path, IsaacEngine, ALPHA, N};
pub use pool::{
    LoadStatus, RandomPool, SeedSummary, SourceSeedReport, Strength, BURN, CAMERA_FRAMES_BASE,
    MIC_WINDOW_MS, OS_BYTES_BASE, SEED_TERMS,
};
pub use seed::{SeedAssembler, SeedWord, N_SPLITS};
pub use source::{EntropySource, SampleAccumulator, SourceInfo};
pub use sources::OsRandomSource;

#[cfg(feature = "camera")]
pub use sources::CameraSource;
#[cfg(feature = "microphone")]
pub use sources::MicrophoneSource;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
