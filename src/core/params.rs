// Edit-LSH: Transducer Probabilities
//
// A single constant p in (0, 1/3] fixes the insertion probability pa and the
// substitution probability pr of the transducer:
//
//   pa = sqrt(p / (1 + p))
//   pr = sqrt(p) / (sqrt(1 + p) - sqrt(p))
//
// The construction satisfies pr * (1 - pa) = pa, so a single substitution
// collides with probability p.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LshError, Result};

/// Largest p for which pa <= 1/2 and pr <= 1.
pub const P_MAX: f64 = 1.0 / 3.0;

/// Resolved probabilities for one hash family instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityParams {
    /// The probability constant p.
    pub p: f64,
    /// Probability of a random insertion (blank, cursor unchanged).
    pub pa: f64,
    /// Probability of a substitution (blank, cursor advances) given no insertion.
    pub pr: f64,
}

impl ProbabilityParams {
    /// Derives (pa, pr) from p.
    ///
    /// # Errors
    ///
    /// Returns `LshError::InvalidProbability` unless `0 < p <= upper` and
    /// `upper <= 1/3`.
    pub fn from_p(p: f64, upper: f64) -> Result<Self> {
        let upper = upper.min(P_MAX);
        if !p.is_finite() || p <= 0.0 || p > upper {
            return Err(LshError::InvalidProbability { p, upper });
        }
        let root_p = p.sqrt();
        let root_1p = (1.0 + p).sqrt();
        let params = Self {
            p,
            pa: (p / (1.0 + p)).sqrt(),
            pr: root_p / (root_1p - root_p),
        };
        params.check_rates()?;
        Ok(params)
    }

    /// Accepts (pa, pr) as given and recovers p = pa^2 / (1 - pa^2).
    ///
    /// # Errors
    ///
    /// Returns `LshError::InvalidRates` unless `pa` is in (0, 0.5] and `pr`
    /// is in (0, 1].
    pub fn from_rates(pa: f64, pr: f64) -> Result<Self> {
        let params = Self {
            p: pa * pa / (1.0 - pa * pa),
            pa,
            pr,
        };
        params.check_rates()?;
        Ok(params)
    }

    /// Draws p uniformly from (0, upper) and derives the rates.
    pub fn sample<R: Rng>(rng: &mut R, upper: f64) -> Result<Self> {
        let upper = upper.min(P_MAX);
        if !upper.is_finite() || upper <= 0.0 {
            return Err(LshError::InvalidProbability { p: upper, upper });
        }
        let mut p = rng.random::<f64>() * upper;
        while p <= 0.0 {
            p = rng.random::<f64>() * upper;
        }
        Self::from_p(p, upper)
    }

    fn check_rates(&self) -> Result<()> {
        let pa_ok = self.pa.is_finite() && self.pa > 0.0 && self.pa <= 0.5 + 1e-12;
        let pr_ok = self.pr.is_finite() && self.pr > 0.0 && self.pr <= 1.0 + 1e-12;
        if pa_ok && pr_ok {
            Ok(())
        } else {
            Err(LshError::InvalidRates {
                pa: self.pa,
                pr: self.pr,
            })
        }
    }

    /// Recall floor for pairs within edit distance `r` over a corpus of `n`:
    /// `p^r - 2/n^2`.
    pub fn recall_floor(&self, r: usize, n: usize) -> f64 {
        let n = n.max(1) as f64;
        self.p.powi(r as i32) - 2.0 / (n * n)
    }

    /// Soundness ceiling for pairs at edit distance at least `c * r`:
    /// `(3p)^(c*r)`.
    pub fn soundness_ceiling(&self, c: usize, r: usize) -> f64 {
        (3.0 * self.p).powi((c * r) as i32)
    }
}

/// Transcript length bound `L = 8d / (1 - pa) + 6 ln(n)`.
///
/// `d` is the longest string length the system is built for and `n` the
/// corpus size.
pub fn max_transcript_len(max_string_len: usize, corpus_size: usize, pa: f64) -> f64 {
    let n = corpus_size.max(1) as f64;
    8.0 * max_string_len as f64 / (1.0 - pa) + 6.0 * n.ln()
}
