use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;

/// Draws `stock_count` uniforms in [0, 1) and rescales them to sum to one.
///
/// This is a structural sampler only: the result lies on the probability
/// simplex but says nothing about the profit floor.
pub fn random_allocation<R: Rng + ?Sized>(stock_count: usize, rng: &mut R) -> Vec<f64> {
    let uniform = Uniform::new(0., 1.);
    let mut weights = (0..stock_count)
        .map(|_| rng.sample(uniform))
        .collect::<Vec<f64>>();

    let magnitude = weights.iter().sum::<f64>();
    if magnitude > 0.0 {
        weights.iter_mut().for_each(|w| *w /= magnitude);
    } else if stock_count > 0 {
        // every draw came out as exactly zero
        weights.fill(1.0 / stock_count as f64);
    }
    weights
}

/// Reproducible generator for sampling runs. Without a seed one is drawn
/// from the OS and returned so the run can be replayed.
pub fn seeded_rng(seed: Option<u64>) -> (ChaCha20Rng, u64) {
    let seed = seed.unwrap_or_else(|| OsRng.next_u64());
    (ChaCha20Rng::seed_from_u64(seed), seed)
}
