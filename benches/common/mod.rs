// Shared benchmark setup module with factory functions for creating test fixtures.
//
// All factory functions are deterministic: identical inputs produce identical outputs.

#![allow(dead_code)]
use criterion::Criterion;
use edit_lsh::{perturb, Alphabet, Ensemble, LshConfig, OracleStrategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Shared Criterion configuration for consistent benchmark timing.
///
/// - sample_size(10): reduced from default 100
/// - measurement_time(1s): reduced from default 5s
/// - warm_up_time(500ms): reduced from default 3s
/// - noise_threshold(0.05): 5% regression threshold
/// - significance_level(0.05): 95% confidence
///
/// For faster iteration, run individual targets: `cargo bench --bench <target>`
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(1))
        .warm_up_time(Duration::from_millis(500))
        .noise_threshold(0.05)
        .significance_level(0.05)
}

/// Random DNA sequence of `len` bases plus the terminator.
pub fn dna_sequence(rng: &mut StdRng, len: usize) -> String {
    let alphabet = Alphabet::dna();
    let bases = &alphabet.symbols()[..alphabet.len() - 1];
    let mut s: String = (0..len)
        .map(|_| bases[rng.random_range(0..bases.len())])
        .collect();
    s.push(alphabet.terminator());
    s
}

/// `n` sequences of `len` bases. Every fourth one is a few deletions away
/// from its predecessor so the corpus contains near-duplicates.
pub fn dna_corpus(n: usize, len: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut corpus: Vec<String> = Vec::with_capacity(n);
    for i in 0..n {
        let item = match corpus.last() {
            Some(prev) if i % 4 == 3 => {
                let edits = rng.random_range(1..=3);
                perturb(prev, edits, &mut rng)
            }
            _ => dna_sequence(&mut rng, len),
        };
        corpus.push(item);
    }
    corpus
}

/// Lowercase dictionary-style words.
pub fn word_corpus() -> Vec<String> {
    [
        "apple", "apply", "ample", "maple", "applet", "grape", "gape", "grace", "trace",
        "track", "trick", "brick", "bride", "pride", "prize", "price", "spice", "slice",
        "slick", "stick", "stock", "stack", "snack", "snake", "shake", "shape", "share",
        "spare", "spore", "store", "stone", "shone",
    ]
    .iter()
    .map(|w| format!("{w}$"))
    .collect()
}

/// DNA configuration fitted to `corpus` with a fixed seed.
pub fn dna_config(corpus: &[String], ensemble_size: usize, oracle: OracleStrategy) -> LshConfig {
    LshConfig::dna()
        .fit_corpus(corpus)
        .with_ensemble_size(ensemble_size)
        .with_oracle(oracle)
        .with_seed(0xBE7C)
}

/// Ensemble over `corpus` using [`dna_config`].
pub fn dna_ensemble(corpus: &[String], ensemble_size: usize) -> Ensemble {
    Ensemble::build(corpus, &dna_config(corpus, ensemble_size, OracleStrategy::Table))
        .expect("benchmark configuration is valid")
}
