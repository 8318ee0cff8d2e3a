// Edit-LSH: Workload Helpers
//
// Corpus loading seam, nearby-string generation for experiments, and
// ensemble sizing.

use rand::Rng;

use crate::core::params::ProbabilityParams;
use crate::error::{LshError, Result};

/// Ordered corpus provider. File and document readers live outside this
/// crate and implement this trait.
pub trait CorpusSource {
    fn load(&self) -> Result<Vec<String>>;
}

impl CorpusSource for Vec<String> {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

impl CorpusSource for [&str] {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.iter().map(|s| s.to_string()).collect())
    }
}

impl CorpusSource for [String] {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.to_vec())
    }
}

/// Deletes `edits` randomly chosen symbols from `word` (all of them if
/// `edits` exceeds its length). The result is at edit distance at most
/// `edits` from the input.
pub fn perturb<R: Rng>(word: &str, edits: usize, rng: &mut R) -> String {
    let mut symbols: Vec<char> = word.chars().collect();
    for _ in 0..edits.min(symbols.len()) {
        let at = rng.random_range(0..symbols.len());
        symbols.remove(at);
    }
    symbols.into_iter().collect()
}

/// Ensemble size `ceil(1 / p1)` with `p1 = p^r - 2/n^2`, the recall floor
/// for pairs within distance `r`.
///
/// # Errors
///
/// Returns `LshError::Config` when the floor is not positive, i.e. the
/// corpus is too small for the requested radius.
pub fn recommended_ensemble_size(
    params: &ProbabilityParams,
    radius: usize,
    corpus_len: usize,
) -> Result<usize> {
    let floor = params.recall_floor(radius, corpus_len);
    if !(floor > 0.0) {
        return Err(LshError::Config(format!(
            "recall floor p^{radius} - 2/n^2 = {floor} is not positive for n = {corpus_len}"
        )));
    }
    Ok((1.0 / floor).ceil() as usize)
}
