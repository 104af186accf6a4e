//! Seed a pool from a caller-supplied entropy source and keep the state
//! encrypted at rest.
//!
//! Run with: cargo run --example custom_source

use isaacpool_core::{
    EntropySource, LoadStatus, RandomPool, Result, SampleAccumulator, SourceInfo,
};

static DICE_INFO: SourceInfo = SourceInfo {
    name: "dice",
    description: "stand-in hardware source for the example",
    physics: "none here; a real implementation would read a device",
    bits_per_sample: 8,
};

/// A toy source. Real implementations would fill the accumulator from a
/// device; this one uses process-local timing jitter so the example runs
/// anywhere.
struct DiceSource {
    acc: SampleAccumulator,
}

impl DiceSource {
    fn new() -> Self {
        Self {
            acc: SampleAccumulator::new(8),
        }
    }
}

impl EntropySource for DiceSource {
    fn info(&self) -> &SourceInfo {
        &DICE_INFO
    }

    fn capture(&mut self, amount: usize) -> Result<()> {
        let mut state = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos() as u64
            | 1;
        for _ in 0..amount {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.acc.push_byte((state >> 33) as u8);
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

fn main() {
    let state = "./demo-sealed-state";
    let key = [0x42u8; 32];

    let mut pool = RandomPool::new();
    match pool.is_initialized(state, &key) {
        LoadStatus::Success => println!("resumed sealed state from {state}"),
        LoadStatus::DecryptionError => {
            eprintln!("state exists but the key does not match");
            std::process::exit(1);
        }
        _ => {
            let mut dice = DiceSource::new();
            dice.capture(1 << 16).expect("toy capture cannot fail");
            pool.initialize_from_sources(state, &key, &mut [&mut dice])
                .expect("seeding from the toy source");
            println!("seeded fresh state into {state}");
        }
    }

    let mut block = [0u8; 32];
    pool.generate(&mut block).expect("pool is seeded");
    for b in block {
        print!("{b:02x}");
    }
    println!();

    pool.save_state().expect("state should persist");
}
