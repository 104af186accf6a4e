//! CLI for isaacpool — seeded random bytes with encrypted state persistence.

mod cli;
mod logging;
mod output;

use std::process;

use clap::Parser;
use serde::Serialize;

use isaacpool_core::{LoadStatus, RandomPool, Strength};

use cli::{Cli, Command, GenerateArgs, StatusArgs};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    match cli.command {
        Command::Generate(args) => run_generate(&args),
        Command::Status(args) => run_status(&args),
    }
}

fn run_generate(args: &GenerateArgs) {
    if args.bytes == 0 {
        log::error!("byte count must be greater than 0");
        process::exit(1);
    }

    let key = match cli::resolve_key(&args.state) {
        Ok(k) => k,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    let mut pool = RandomPool::new();
    let status = if args.reseed {
        LoadStatus::FileNotFound
    } else {
        pool.is_initialized(&args.state.state, &key)
    };

    match status {
        LoadStatus::Success => {
            log::info!("resumed state from {}", args.state.state);
        }
        LoadStatus::DecryptionError => {
            log::error!("state file did not authenticate under the supplied key");
            process::exit(1);
        }
        LoadStatus::FileNotFound | LoadStatus::RngInitError => {
            log::info!(
                "gathering fresh entropy (strength: {})",
                RandomPool::entropy_strength()
            );
            if let Err(e) = pool.initialize(&args.state.state, args.multiplier, &key) {
                log::error!("seeding failed: {e}");
                process::exit(1);
            }
            if let Some(summary) = pool.last_seed_summary() {
                for source in &summary.sources {
                    log::info!(
                        "admitted {} bytes from {} (mean bit probability {:.4})",
                        source.bytes,
                        source.name,
                        source.mean_bit_probability
                    );
                }
            }
        }
    }

    let mut bytes = vec![0u8; args.bytes];
    if let Err(e) = pool.generate(&mut bytes) {
        log::error!("{e}");
        process::exit(1);
    }
    if let Err(e) = pool.save_state() {
        log::error!("failed to persist state: {e}");
        process::exit(1);
    }

    if let Err(e) = output::write_output(&bytes, args.format, args.output_file.as_deref()) {
        log::error!("error writing output: {e}");
        process::exit(1);
    }
}

#[derive(Serialize)]
struct StatusReport<'a> {
    state_file: &'a str,
    status: LoadStatus,
    strength: Strength,
}

fn run_status(args: &StatusArgs) {
    let key = match cli::resolve_key(&args.state) {
        Ok(k) => k,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    let mut pool = RandomPool::new();
    let status = pool.is_initialized(&args.state.state, &key);

    let report = StatusReport {
        state_file: &args.state.state,
        status,
        strength: RandomPool::entropy_strength(),
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("cannot serialize status: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("state file: {}", report.state_file);
        println!("status:     {:?}", report.status);
        println!("strength:   {}", report.strength);
    }

    // exit() skips destructors: a status probe must not rewrite the state
    // file through the engine's save-on-drop hook.
    process::exit(match status {
        LoadStatus::Success => 0,
        LoadStatus::FileNotFound => 2,
        LoadStatus::DecryptionError => 3,
        LoadStatus::RngInitError => 4,
    });
}
