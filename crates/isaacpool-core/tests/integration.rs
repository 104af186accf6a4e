//! Integration tests for isaacpool-core.
//!
//! These exercise the full pipeline: source admission → split hashing →
//! seeding → whitened output → encrypted persistence → restore. Tests that
//! touch real devices or capture the full OS budget are `#[ignore]`d; run
//! them with `cargo test -- --ignored`.

use isaacpool_core::{
    EntropySource, Error, LoadStatus, RandomPool, Result, SampleAccumulator, SourceInfo,
};

static REPLAY_INFO: SourceInfo = SourceInfo {
    name: "replay",
    description: "deterministic replay source for integration tests",
    physics: "none; canned bytes",
    bits_per_sample: 8,
};

/// Deterministic source replaying a canned stream through the real
/// per-source accumulator.
struct ReplaySource {
    acc: SampleAccumulator,
}

impl ReplaySource {
    fn uniform(n: usize, seed: u64) -> Self {
        let mut acc = SampleAccumulator::new(8);
        let mut state = seed;
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            acc.push_byte((state >> 33) as u8);
        }
        Self { acc }
    }
}

impl EntropySource for ReplaySource {
    fn info(&self) -> &SourceInfo {
        &REPLAY_INFO
    }

    fn capture(&mut self, _amount: usize) -> Result<()> {
        Ok(())
    }

    fn bit_entropy(&self) -> Vec<f64> {
        self.acc.bit_entropy()
    }

    fn drain(&mut self, out: &mut Vec<u8>) {
        self.acc.drain(out);
    }
}

fn seeded_pool(path: &str, key: &[u8], stream_seed: u64) -> RandomPool {
    let mut pool = RandomPool::new();
    let mut source = ReplaySource::uniform(1 << 16, stream_seed);
    pool.initialize_from_sources(path, key, &mut [&mut source])
        .unwrap();
    pool
}

#[test]
fn seeding_is_deterministic_across_pools() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a").to_string_lossy().into_owned();
    let path_b = dir.path().join("b").to_string_lossy().into_owned();

    let mut a = seeded_pool(&path_a, &[], 42);
    let mut b = seeded_pool(&path_b, &[], 42);

    let mut out_a = [0u8; 256];
    let mut out_b = [0u8; 256];
    a.generate(&mut out_a).unwrap();
    b.generate(&mut out_b).unwrap();
    assert_eq!(out_a, out_b);

    let mut c = seeded_pool(&dir.path().join("c").to_string_lossy(), &[], 43);
    let mut out_c = [0u8; 256];
    c.generate(&mut out_c).unwrap();
    assert_ne!(out_a, out_c);
}

#[test]
fn plaintext_state_round_trip_preserves_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").to_string_lossy().into_owned();

    // Control pool runs uninterrupted; probe pool saves and is restored.
    let control_path = dir.path().join("control").to_string_lossy().into_owned();
    let mut control = seeded_pool(&control_path, &[], 7);
    let mut probe = seeded_pool(&path, &[], 7);

    let mut burn = [0u8; 100];
    control.generate(&mut burn).unwrap();
    probe.generate(&mut burn).unwrap();

    probe.save_state().unwrap();
    drop(probe);

    let mut restored = RandomPool::new();
    assert_eq!(restored.is_initialized(&path, &[]), LoadStatus::Success);

    let mut expected = [0u8; 1024];
    let mut got = [0u8; 1024];
    control.generate(&mut expected).unwrap();
    restored.generate(&mut got).unwrap();
    assert_eq!(expected, got);
}

#[test]
fn dropped_pool_leaves_a_resumable_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").to_string_lossy().into_owned();
    let control_path = dir.path().join("control").to_string_lossy().into_owned();

    let mut control = seeded_pool(&control_path, &[], 11);
    {
        // Dropped without an explicit save: the engine's drop hook must
        // persist the state on its own.
        let _probe = seeded_pool(&path, &[], 11);
    }
    assert!(std::path::Path::new(&path).exists());

    let mut restored = RandomPool::new();
    assert_eq!(restored.is_initialized(&path, &[]), LoadStatus::Success);

    let mut expected = [0u8; 1024];
    let mut got = [0u8; 1024];
    control.generate(&mut expected).unwrap();
    restored.generate(&mut got).unwrap();
    assert_eq!(expected, got);
}

#[test]
fn encrypted_state_requires_the_right_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sealed").to_string_lossy().into_owned();
    let k1 = [0x01u8; 32];
    let k2 = [0x02u8; 32];

    let mut pool = seeded_pool(&path, &k1, 99);
    pool.save_state().unwrap();

    let mut right = RandomPool::new();
    assert_eq!(right.is_initialized(&path, &k1), LoadStatus::Success);

    let mut wrong = RandomPool::new();
    assert_eq!(wrong.is_initialized(&path, &k2), LoadStatus::DecryptionError);
    assert!(matches!(
        wrong.generate(&mut [0u8; 16]),
        Err(Error::NotInitialized)
    ));
}

#[test]
fn rekeying_changes_the_container_not_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rekeyed").to_string_lossy().into_owned();
    let control_path = dir.path().join("control").to_string_lossy().into_owned();
    let key = [0xA5u8; 32];

    let mut control = seeded_pool(&control_path, &[], 123);
    let mut pool = seeded_pool(&path, &[], 123);

    // Turn encryption on after seeding; the output stream is unaffected.
    pool.initialize_encryption(&key);
    pool.save_state().unwrap();
    drop(pool);

    let mut plain = RandomPool::new();
    assert_eq!(plain.is_initialized(&path, &[]), LoadStatus::RngInitError);

    let mut restored = RandomPool::new();
    assert_eq!(restored.is_initialized(&path, &key), LoadStatus::Success);

    let mut expected = [0u8; 512];
    let mut got = [0u8; 512];
    control.generate(&mut expected).unwrap();
    restored.generate(&mut got).unwrap();
    assert_eq!(expected, got);
}

#[test]
fn reseeding_invalidates_previous_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").to_string_lossy().into_owned();

    let mut pool = seeded_pool(&path, &[], 1);
    let mut first = [0u8; 64];
    pool.generate(&mut first).unwrap();

    let mut source = ReplaySource::uniform(1 << 16, 2);
    pool.initialize_from_sources(&path, &[], &mut [&mut source])
        .unwrap();
    let mut second = [0u8; 64];
    pool.generate(&mut second).unwrap();
    assert_ne!(first, second);
}

#[test]
fn multiple_sources_all_feed_the_seed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multi").to_string_lossy().into_owned();
    let solo_path = dir.path().join("solo").to_string_lossy().into_owned();

    let mut multi = RandomPool::new();
    let mut one = ReplaySource::uniform(1 << 15, 5);
    let mut two = ReplaySource::uniform(1 << 15, 6);
    multi
        .initialize_from_sources(&path, &[], &mut [&mut one, &mut two])
        .unwrap();

    let summary = multi.last_seed_summary().unwrap();
    assert_eq!(summary.sources.len(), 2);
    assert!(summary.sources.iter().all(|s| s.bytes == 1 << 15));

    // Dropping the second source must change the seed.
    let mut solo = seeded_pool(&solo_path, &[], 5);
    let mut out_multi = [0u8; 64];
    let mut out_solo = [0u8; 64];
    multi.generate(&mut out_multi).unwrap();
    solo.generate(&mut out_solo).unwrap();
    assert_ne!(out_multi, out_solo);
}

#[test]
#[ignore] // Captures the full 100 MiB OS budget; run with: cargo test -- --ignored
fn full_initialize_from_os_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("os-state").to_string_lossy().into_owned();

    let mut pool = RandomPool::new();
    pool.initialize(&path, 0, &[]).unwrap();
    assert!(pool.is_seeded());

    let mut out = [0u8; 4096];
    pool.generate(&mut out).unwrap();
    assert!(out.iter().any(|&b| b != 0));

    let summary = pool.last_seed_summary().unwrap();
    assert!(summary.sources.iter().any(|s| s.name == "os_rng"));

    pool.save_state().unwrap();
    let mut restored = RandomPool::new();
    assert_eq!(restored.is_initialized(&path, &[]), LoadStatus::Success);
}
