// Edit-LSH: Bound Verifier
//
// Cross-checks an ensemble's empirical collision rates against the closed
// form bounds of the construction. Every unordered corpus pair is scored by
// its true edit distance and by how many ensemble members bucket it
// together; pairs are then grouped by distance:
//
//   recall     distance <= r        rate >= p^r - 2/n^2
//   soundness  distance >= c * r    rate <= (3p)^(c*r)
//
// A pair's rate is either the fraction of members that bucket it together
// or, in candidate mode, whether it appears in the ensemble's deduplicated
// candidate set at all.
//
// Violations are reported as data. The ensemble is only read.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::config::{LshConfig, ParameterPolicy, VerifyConfig};
use crate::core::params::ProbabilityParams;
use crate::core::types::CandidatePair;
use crate::edit::{EditOracle, Levenshtein};
use crate::error::{LshError, Result};
use crate::index::ensemble::Ensemble;

/// Which side of the bound a record checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Pairs within distance r must collide at least this often.
    Recall,
    /// Pairs at distance c*r or more must collide at most this often.
    Soundness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// No corpus pair fell in the regime.
    NoData,
}

/// What counts as a collision for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// Number of members that bucket the pair together, out of K.
    #[default]
    MemberCollisions,
    /// 1 if the pair is in the ensemble's candidate set, else 0.
    CandidateMembership,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Observation::MemberCollisions => "member collisions",
            Observation::CandidateMembership => "candidate membership",
        })
    }
}

/// Pair count and summed collision count for one edit distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DistanceBin {
    pub pairs: usize,
    pub collisions: usize,
}

/// Collision counts keyed by true edit distance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DistanceHistogram {
    bins: BTreeMap<usize, DistanceBin>,
}

impl DistanceHistogram {
    /// Adds one pair at `distance` that collided under `collisions` members.
    pub fn record(&mut self, distance: usize, collisions: usize) {
        let bin = self.bins.entry(distance).or_default();
        bin.pairs += 1;
        bin.collisions += collisions;
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (distance, bin) in other.bins {
            let entry = self.bins.entry(distance).or_default();
            entry.pairs += bin.pairs;
            entry.collisions += bin.collisions;
        }
        self
    }

    pub fn bin(&self, distance: usize) -> Option<&DistanceBin> {
        self.bins.get(&distance)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DistanceBin)> + '_ {
        self.bins.iter().map(|(&d, bin)| (d, bin))
    }

    /// Total number of pairs recorded.
    pub fn pairs(&self) -> usize {
        self.bins.values().map(|bin| bin.pairs).sum()
    }

    fn sum_where(&self, keep: impl Fn(usize) -> bool) -> DistanceBin {
        self.bins
            .iter()
            .filter(|&(&d, _)| keep(d))
            .fold(DistanceBin::default(), |acc, (_, bin)| DistanceBin {
                pairs: acc.pairs + bin.pairs,
                collisions: acc.collisions + bin.collisions,
            })
    }
}

/// Outcome of one regime at one radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundRecord {
    pub radius: usize,
    pub regime: Regime,
    /// Collisions observed / (pairs * K); `None` without pairs.
    pub empirical: Option<f64>,
    pub bound: f64,
    /// Pairs that fell in the regime.
    pub pairs: usize,
    pub verdict: Verdict,
}

impl fmt::Display for BoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, cmp) = match self.regime {
            Regime::Recall => ("recall", ">="),
            Regime::Soundness => ("soundness", "<="),
        };
        let verdict = match self.verdict {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::NoData => "NO DATA",
        };
        match self.empirical {
            Some(rate) => write!(
                f,
                "r={} {name}: rate {rate:.6} {cmp} {:.6} over {} pairs [{verdict}]",
                self.radius, self.bound, self.pairs
            ),
            None => write!(
                f,
                "r={} {name}: bound {:.6}, no pairs [{verdict}]",
                self.radius, self.bound
            ),
        }
    }
}

/// Result of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub observation: Observation,
    pub params: ProbabilityParams,
    pub ensemble_size: usize,
    pub corpus_len: usize,
    pub amplification: usize,
    pub records: Vec<BoundRecord>,
    pub histogram: DistanceHistogram,
}

impl VerificationReport {
    /// True when no record failed. `NoData` records do not count as failures.
    pub fn passed(&self) -> bool {
        self.records.iter().all(|r| r.verdict != Verdict::Fail)
    }

    pub fn violations(&self) -> impl Iterator<Item = &BoundRecord> + '_ {
        self.records.iter().filter(|r| r.verdict == Verdict::Fail)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "p={:.6} pa={:.6} pr={:.6} K={} n={} c={} ({})",
            self.params.p,
            self.params.pa,
            self.params.pr,
            self.ensemble_size,
            self.corpus_len,
            self.amplification,
            self.observation
        )?;
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

/// Collision rate of one pair and the window it is expected to fall in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairProbe {
    pub distance: usize,
    pub collisions: usize,
    pub ensemble_size: usize,
    pub rate: f64,
    /// p^r - 2/n^2
    pub lower: f64,
    /// p^r
    pub upper: f64,
    pub within: bool,
}

/// Checks ensembles against the recall and soundness bounds, using `E` for
/// true edit distances.
#[derive(Debug, Clone)]
pub struct BoundVerifier<E = Levenshtein> {
    oracle: E,
}

impl Default for BoundVerifier {
    fn default() -> Self {
        Self::new(Levenshtein)
    }
}

impl<E: EditOracle> BoundVerifier<E> {
    pub fn new(oracle: E) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &E {
        &self.oracle
    }

    /// Scores every unordered pair of `corpus` and evaluates both regimes
    /// for each radius in `config`.
    ///
    /// # Errors
    ///
    /// - `LshError::Config` if `config` is malformed (empty radius range,
    ///   zero amplification) or the ensemble members do not share one p
    /// - `LshError::Corpus` if `corpus` is not the corpus the ensemble was
    ///   built over
    #[tracing::instrument(skip(self, corpus, ensemble, config), fields(corpus_len = corpus.len(), ensemble_size = ensemble.len()))]
    pub fn verify<S: AsRef<str> + Sync>(
        &self,
        corpus: &[S],
        ensemble: &Ensemble,
        config: &VerifyConfig,
    ) -> Result<VerificationReport> {
        let params = check_inputs(corpus.len(), ensemble, config)?;
        let histogram = self.scan(corpus, |i, j| ensemble.collisions(i, j));
        Ok(report(
            Observation::MemberCollisions,
            params,
            ensemble,
            config,
            ensemble.len(),
            histogram,
        ))
    }

    /// Like [`verify`](Self::verify), but a pair counts as colliding when it
    /// is in the ensemble's candidate set, so each pair contributes one
    /// observation rather than K. This scores what a caller actually
    /// receives from candidate generation.
    ///
    /// # Errors
    ///
    /// Same as [`verify`](Self::verify).
    #[tracing::instrument(skip(self, corpus, ensemble, config), fields(corpus_len = corpus.len(), ensemble_size = ensemble.len()))]
    pub fn verify_candidates<S: AsRef<str> + Sync>(
        &self,
        corpus: &[S],
        ensemble: &Ensemble,
        config: &VerifyConfig,
    ) -> Result<VerificationReport> {
        let params = check_inputs(corpus.len(), ensemble, config)?;
        let candidates = ensemble.candidate_pairs();
        let histogram = self.scan(corpus, |i, j| {
            CandidatePair::new(i, j).map_or(0, |pair| usize::from(candidates.contains(&pair)))
        });
        Ok(report(
            Observation::CandidateMembership,
            params,
            ensemble,
            config,
            1,
            histogram,
        ))
    }

    /// Histogram of every unordered pair `(i, j)`, scored by `count`.
    ///
    /// The O(n^2) scan is sharded by first item; each shard fills its own
    /// histogram and the shards are merged at the end.
    fn scan<S, F>(&self, corpus: &[S], count: F) -> DistanceHistogram
    where
        S: AsRef<str> + Sync,
        F: Fn(usize, usize) -> usize + Sync,
    {
        let n = corpus.len();
        (0..n)
            .into_par_iter()
            .fold(DistanceHistogram::default, |mut shard, i| {
                for j in (i + 1)..n {
                    let distance = self.oracle.distance(corpus[i].as_ref(), corpus[j].as_ref());
                    shard.record(distance, count(i, j));
                }
                shard
            })
            .reduce(DistanceHistogram::default, DistanceHistogram::merge)
    }

    /// Builds a fresh ensemble over just `x` and `y` and reports how often
    /// its members collide them, against the window [p^r - 2/n^2, p^r].
    ///
    /// `config.corpus_size` supplies n, so the window matches the corpus the
    /// configuration describes rather than the two-item probe corpus.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`, or `LshError::Config` if
    /// `config` does not use a shared p.
    pub fn probe_pair(&self, x: &str, y: &str, config: &LshConfig) -> Result<PairProbe> {
        if config.policy != ParameterPolicy::Shared {
            return Err(LshError::Config("pair probes need a shared p".to_string()));
        }
        let params = config.resolve_params()?;
        let ensemble = Ensemble::build(&[x, y], config)?;
        let distance = self.oracle.distance(x, y);
        let collisions = ensemble.collisions(0, 1);
        let rate = collisions as f64 / ensemble.len() as f64;
        let upper = params.p.powi(distance as i32);
        let lower = params.recall_floor(distance, config.corpus_size);
        Ok(PairProbe {
            distance,
            collisions,
            ensemble_size: ensemble.len(),
            rate,
            lower,
            upper,
            within: rate >= lower && rate <= upper,
        })
    }
}

/// Validates `config` and the corpus, then returns the ensemble's shared p.
fn check_inputs(
    corpus_len: usize,
    ensemble: &Ensemble,
    config: &VerifyConfig,
) -> Result<ProbabilityParams> {
    config.validate()?;
    let params = *ensemble.shared_params().ok_or_else(|| {
        LshError::Config("verification needs an ensemble built with a shared p".to_string())
    })?;
    ensemble.check_corpus_len(corpus_len)?;
    Ok(params)
}

fn report(
    observation: Observation,
    params: ProbabilityParams,
    ensemble: &Ensemble,
    config: &VerifyConfig,
    observations_per_pair: usize,
    histogram: DistanceHistogram,
) -> VerificationReport {
    let corpus_len = ensemble.corpus_len();
    let records = evaluate(&histogram, &params, observations_per_pair, corpus_len, config);
    let failures = records.iter().filter(|r| r.verdict == Verdict::Fail).count();
    tracing::info!(
        observation = %observation,
        pairs = histogram.pairs(),
        records = records.len(),
        failures,
        "verification finished"
    );
    VerificationReport {
        observation,
        params,
        ensemble_size: ensemble.len(),
        corpus_len,
        amplification: config.amplification,
        records,
        histogram,
    }
}

/// Evaluates both regimes for every radius in `config` against `histogram`.
///
/// `ensemble_size` is the number of observations behind each pair (K for
/// member collisions, 1 for candidate membership) and `corpus_len` is n. A
/// regime without pairs gets `Verdict::NoData`.
pub fn evaluate(
    histogram: &DistanceHistogram,
    params: &ProbabilityParams,
    ensemble_size: usize,
    corpus_len: usize,
    config: &VerifyConfig,
) -> Vec<BoundRecord> {
    let mut records = Vec::with_capacity(2 * config.radii().count());
    for radius in config.radii() {
        let far = config.amplification * radius;
        records.push(judge(
            radius,
            Regime::Recall,
            histogram.sum_where(|d| d <= radius),
            params.recall_floor(radius, corpus_len),
            ensemble_size,
        ));
        records.push(judge(
            radius,
            Regime::Soundness,
            histogram.sum_where(|d| d >= far),
            params.soundness_ceiling(config.amplification, radius),
            ensemble_size,
        ));
    }
    records
}

fn judge(
    radius: usize,
    regime: Regime,
    bin: DistanceBin,
    bound: f64,
    ensemble_size: usize,
) -> BoundRecord {
    let observations = bin.pairs * ensemble_size;
    let empirical = (observations > 0).then(|| bin.collisions as f64 / observations as f64);
    let verdict = match (empirical, regime) {
        (None, _) => Verdict::NoData,
        (Some(rate), Regime::Recall) if rate >= bound => Verdict::Pass,
        (Some(rate), Regime::Soundness) if rate <= bound => Verdict::Pass,
        (Some(_), _) => Verdict::Fail,
    };
    if verdict == Verdict::Fail {
        tracing::warn!(
            radius,
            regime = ?regime,
            empirical = ?empirical,
            bound,
            pairs = bin.pairs,
            "collision bound violated"
        );
    }
    BoundRecord {
        radius,
        regime,
        empirical,
        bound,
        pairs: bin.pairs,
        verdict,
    }
}
