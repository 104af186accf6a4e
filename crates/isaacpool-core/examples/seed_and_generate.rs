//! Seed a pool from the compiled-in schedule, print a few blocks, and
//! leave a resumable state file behind.
//!
//! Run with: cargo run --example seed_and_generate

use isaacpool_core::{LoadStatus, RandomPool};

fn main() {
    let state = "./demo-rng-state";
    let mut pool = RandomPool::new();

    match pool.is_initialized(state, &[]) {
        LoadStatus::Success => println!("resumed state from {state}"),
        status => {
            println!("no usable state ({status:?}); gathering entropy...");
            println!("entropy strength: {}", RandomPool::entropy_strength());
            if let Err(e) = pool.initialize(state, 0, &[]) {
                eprintln!("seeding failed: {e}");
                std::process::exit(1);
            }
            if let Some(summary) = pool.last_seed_summary() {
                for source in &summary.sources {
                    println!(
                        "  {}: {} bytes, mean bit probability {:.4}",
                        source.name, source.bytes, source.mean_bit_probability
                    );
                }
            }
        }
    }

    let mut block = [0u8; 32];
    for _ in 0..4 {
        pool.generate(&mut block).expect("pool is seeded");
        for b in block {
            print!("{b:02x}");
        }
        println!();
    }

    pool.save_state().expect("state should persist");
    println!("state saved to {state}");
}
