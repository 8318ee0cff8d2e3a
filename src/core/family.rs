// Edit-LSH: Hash Family
//
// A randomized character transducer. For each step it asks the oracle for
// (r1, r2) keyed by (current input symbol, current transcript length):
//
//   r1 <= pa          -> emit blank, keep cursor      (random insertion)
//   else r2 <= pr     -> emit blank, advance cursor   (substitution)
//   else              -> emit the symbol, advance     (match)
//
// The run stops when the input is consumed (complete) or the transcript
// reaches the bound L = 8d/(1-pa) + 6 ln(n) first (incomplete). Equal
// transcripts become less likely as the edit distance between two inputs
// grows, which is what makes the family locality-sensitive.

use std::sync::Arc;

use rand::Rng;

use super::alphabet::{Alphabet, BLANK};
use super::config::{LshConfig, ParameterPolicy};
use super::oracle::{Oracle, RandomOracle};
use super::params::ProbabilityParams;
use super::transcript::{Trace, Transcript};
use crate::error::{LshError, Result};

/// One sampled member of the hash family.
///
/// Immutable once sampled. The oracle state is owned by the instance and
/// never shared, so two instances are independent draws.
#[derive(Debug)]
pub struct HashFamily<O = Oracle> {
    params: ProbabilityParams,
    max_len: f64,
    alphabet: Arc<Alphabet>,
    oracle: O,
}

impl HashFamily<Oracle> {
    /// Samples a fresh instance with the given rates, drawing oracle state
    /// from `rng` according to `config.oracle`.
    pub fn sample<R: Rng>(
        rng: &mut R,
        config: &LshConfig,
        alphabet: Arc<Alphabet>,
        params: ProbabilityParams,
    ) -> Self {
        let max_len = config.transcript_bound(&params);
        let width = max_len.ceil() as usize;
        let oracle = Oracle::sample_new(rng, config.oracle, alphabet.len(), width);
        Self {
            params,
            max_len,
            alphabet,
            oracle,
        }
    }

    /// Validates `config` and samples one instance with its configured
    /// probability (or a fresh p under the `Redraw` policy).
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn from_config<R: Rng>(rng: &mut R, config: &LshConfig) -> Result<Self> {
        config.validate()?;
        let params = match config.policy {
            ParameterPolicy::Shared => config.resolve_params()?,
            ParameterPolicy::Redraw => ProbabilityParams::sample(rng, config.p_upper)?,
        };
        Ok(Self::sample(
            rng,
            config,
            Arc::new(config.alphabet.clone()),
            params,
        ))
    }
}

impl<O: RandomOracle> HashFamily<O> {
    /// Builds an instance around caller-supplied oracle state.
    ///
    /// # Errors
    ///
    /// Returns `LshError::Config` if `max_len` is not a positive finite
    /// number.
    pub fn with_oracle(
        params: ProbabilityParams,
        max_len: f64,
        alphabet: Arc<Alphabet>,
        oracle: O,
    ) -> Result<Self> {
        if !max_len.is_finite() || max_len <= 0.0 {
            return Err(LshError::Config(format!(
                "transcript bound must be positive (got {max_len})"
            )));
        }
        Ok(Self {
            params,
            max_len,
            alphabet,
            oracle,
        })
    }

    pub fn params(&self) -> &ProbabilityParams {
        &self.params
    }

    /// Transcript length bound L.
    pub fn max_len(&self) -> f64 {
        self.max_len
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Runs the transducer over `x` and keeps the raw output, finished or not.
    pub fn trace(&self, x: &str) -> Trace {
        let mut symbols = String::with_capacity(x.len());
        let mut emitted = 0usize;
        let mut consumed = 0usize;
        let mut chars = x.chars();
        let mut current = chars.next();

        while let Some(c) = current {
            if emitted as f64 >= self.max_len {
                break;
            }
            let (r1, r2) = self.oracle.sample(self.alphabet.index_of(c), emitted);
            if r1 <= self.params.pa {
                symbols.push(BLANK);
            } else {
                symbols.push(if r2 <= self.params.pr { BLANK } else { c });
                consumed += 1;
                current = chars.next();
            }
            emitted += 1;
        }

        Trace {
            symbols,
            emitted,
            consumed,
            complete: current.is_none(),
        }
    }

    /// Hashes `x` to its transcript under this instance.
    ///
    /// Deterministic: the same instance always maps the same string to the
    /// same transcript.
    pub fn hash_str(&self, x: &str) -> Transcript {
        self.trace(x).into_transcript()
    }
}
