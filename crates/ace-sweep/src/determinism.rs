use ace_core::derive_substream_seed;

const POPULATION_STREAM: u64 = 0x01;
const SAMPLE_STREAM: u64 = 0x02;
const SEED_PLAN_STREAM: u64 = 0x03;

/// Derives the deterministic seed used for the population draw.
pub fn population_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed, POPULATION_STREAM)
}

/// Derives the deterministic seed for the working-sample draw.
///
/// The sample seed depends on both the master seed and the sample size N, so
/// studies at different N draw distinct but reproducible samples.
pub fn sample_seed(master_seed: u64, n: usize) -> u64 {
    derive_substream_seed(derive_substream_seed(master_seed, SAMPLE_STREAM), n as u64)
}

/// Derives the deterministic seed for the seed-plan draw.
pub fn seed_plan_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed, SEED_PLAN_STREAM)
}
