#![allow(dead_code)]

use std::env;

use log::LevelFilter;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sv39_pte::Field;

/// Iterations for randomized checks.
pub const ROUNDS: usize = 4096;

pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(LevelFilter::Debug)
        .try_init();
}

/// A seeded generator. Set `PTE_TEST_SEED` to replay the seed logged by
/// a failing run.
pub fn rng() -> StdRng {
    let seed = env::var("PTE_TEST_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(rand::random::<u64>);
    log::info!("rng seed: {}", seed);
    StdRng::seed_from_u64(seed)
}

/// A random value that fits in `field`.
pub fn value_for(rng: &mut StdRng, field: Field) -> u64 {
    rng.gen_range(0..=field.max())
}
