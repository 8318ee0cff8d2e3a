// Edit-LSH: Configuration Types
//
// One configuration object per run, threaded explicitly through hash family
// sampling, ensemble construction and verification.

use serde::{Deserialize, Serialize};

use super::alphabet::Alphabet;
use super::oracle::OracleStrategy;
use super::params::{max_transcript_len, ProbabilityParams, P_MAX};
use crate::error::{LshError, Result};

/// How the probability constant is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilitySpec {
    /// The constant p; pa and pr are derived from it.
    P(f64),
    /// pa and pr given directly.
    Direct { pa: f64, pr: f64 },
}

/// How ensemble members obtain their probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterPolicy {
    /// Every member uses the configured probability (verification).
    #[default]
    Shared,
    /// Every member draws its own p uniformly from (0, p_upper) (indexing).
    Redraw,
}

/// Parameters of the collision-bound verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Smallest radius r checked (inclusive).
    pub min_radius: usize,
    /// Largest radius r checked (inclusive).
    pub max_radius: usize,
    /// Amplification constant c: the soundness regime is distance >= c * r.
    pub amplification: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            min_radius: 1,
            max_radius: 4,
            amplification: 5,
        }
    }
}

impl VerifyConfig {
    pub fn radii(&self) -> std::ops::RangeInclusive<usize> {
        self.min_radius..=self.max_radius
    }

    /// Rejects an empty radius range and a zero amplification constant.
    ///
    /// # Errors
    ///
    /// Returns `LshError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.min_radius > self.max_radius {
            return Err(LshError::Config(format!(
                "verify.min_radius ({}) exceeds verify.max_radius ({})",
                self.min_radius, self.max_radius
            )));
        }
        if self.amplification == 0 {
            return Err(LshError::Config("verify.amplification must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Configuration for hash family sampling and ensemble construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshConfig {
    /// Recognised symbols plus terminator.
    pub alphabet: Alphabet,
    /// Probability constant or direct transducer rates.
    pub probability: ProbabilitySpec,
    /// Upper end of the p domain (at most 1/3).
    pub p_upper: f64,
    /// Longest string length d the system is built for, in symbols.
    pub max_string_len: usize,
    /// Corpus size n used in the transcript bound.
    pub corpus_size: usize,
    /// Number of independently sampled hash family instances (K).
    pub ensemble_size: usize,
    /// Shared or per-member probabilities.
    pub policy: ParameterPolicy,
    /// Random oracle strategy.
    pub oracle: OracleStrategy,
    /// Master seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Verification radius range and amplification constant.
    pub verify: VerifyConfig,
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::lowercase(),
            probability: ProbabilitySpec::P(0.1),
            p_upper: P_MAX,
            max_string_len: 100,
            corpus_size: 100,
            ensemble_size: 16,
            policy: ParameterPolicy::Shared,
            oracle: OracleStrategy::Table,
            seed: None,
            verify: VerifyConfig::default(),
        }
    }
}

impl LshConfig {
    /// Dictionary-word deployment: lowercase letters, p in (0, 1/8],
    /// words up to 25 symbols, 100 words, per-member p.
    pub fn dictionary() -> Self {
        Self {
            alphabet: Alphabet::lowercase(),
            probability: ProbabilitySpec::P(0.1),
            p_upper: 0.125,
            max_string_len: 25,
            corpus_size: 100,
            ensemble_size: 100,
            policy: ParameterPolicy::Redraw,
            ..Self::default()
        }
    }

    /// DNA deployment: bases plus terminator, sequences up to 100 bases,
    /// 1682 sequences, 1000 members sharing one p.
    pub fn dna() -> Self {
        Self {
            alphabet: Alphabet::dna(),
            probability: ProbabilitySpec::P(0.2),
            p_upper: P_MAX,
            max_string_len: 100,
            corpus_size: 1682,
            ensemble_size: 1000,
            policy: ParameterPolicy::Shared,
            verify: VerifyConfig {
                min_radius: 1,
                max_radius: 1,
                amplification: 10,
            },
            ..Self::default()
        }
    }

    /// Sets d to the longest string in `corpus` and n to its length.
    pub fn fit_corpus<S: AsRef<str>>(mut self, corpus: &[S]) -> Self {
        self.max_string_len = corpus
            .iter()
            .map(|s| s.as_ref().chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        self.corpus_size = corpus.len().max(1);
        self
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_p(mut self, p: f64) -> Self {
        self.probability = ProbabilitySpec::P(p);
        self
    }

    pub fn with_rates(mut self, pa: f64, pr: f64) -> Self {
        self.probability = ProbabilitySpec::Direct { pa, pr };
        self
    }

    pub fn with_ensemble_size(mut self, size: usize) -> Self {
        self.ensemble_size = size;
        self
    }

    pub fn with_policy(mut self, policy: ParameterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_oracle(mut self, oracle: OracleStrategy) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verify(mut self, verify: VerifyConfig) -> Self {
        self.verify = verify;
        self
    }

    /// Resolves the configured probability into transducer rates.
    ///
    /// # Errors
    ///
    /// Returns `LshError::InvalidProbability` or `LshError::InvalidRates`
    /// when the configured values fall outside their domains.
    pub fn resolve_params(&self) -> Result<ProbabilityParams> {
        match self.probability {
            ProbabilitySpec::P(p) => ProbabilityParams::from_p(p, self.p_upper),
            ProbabilitySpec::Direct { pa, pr } => ProbabilityParams::from_rates(pa, pr),
        }
    }

    /// Transcript length bound L for the given rates.
    pub fn transcript_bound(&self, params: &ProbabilityParams) -> f64 {
        max_transcript_len(self.max_string_len, self.corpus_size, params.pa)
    }

    /// Fails fast on any malformed parameter, before transcript work begins.
    ///
    /// # Errors
    ///
    /// - `LshError::Alphabet` for an empty or malformed alphabet
    /// - `LshError::EmptyEnsemble` when `ensemble_size` is 0
    /// - `LshError::InvalidProbability` / `LshError::InvalidRates` for a bad
    ///   probability under the `Shared` policy
    /// - `LshError::Config` for the remaining fields
    pub fn validate(&self) -> Result<()> {
        self.alphabet.validate()?;
        if self.ensemble_size == 0 {
            return Err(LshError::EmptyEnsemble);
        }
        if self.corpus_size == 0 {
            return Err(LshError::Config("corpus_size must be at least 1".to_string()));
        }
        if self.max_string_len == 0 {
            return Err(LshError::Config("max_string_len must be at least 1".to_string()));
        }
        if !(self.p_upper > 0.0 && self.p_upper <= P_MAX) {
            return Err(LshError::Config(format!(
                "p_upper must lie in (0, 1/3] (got {})",
                self.p_upper
            )));
        }
        if self.policy == ParameterPolicy::Shared {
            self.resolve_params()?;
        }
        self.verify.validate()
    }

    /// Parses and validates a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LshConfig::default().validate().is_ok());
        assert!(LshConfig::dictionary().validate().is_ok());
        assert!(LshConfig::dna().validate().is_ok());
    }

    #[test]
    fn zero_ensemble_fails_fast() {
        let config = LshConfig::default().with_ensemble_size(0);
        assert!(matches!(config.validate(), Err(LshError::EmptyEnsemble)));
    }

    #[test]
    fn bad_shared_probability_fails_fast() {
        let config = LshConfig::default().with_p(0.5);
        assert!(matches!(
            config.validate(),
            Err(LshError::InvalidProbability { .. })
        ));
        let config = LshConfig::default().with_rates(0.7, 0.2);
        assert!(matches!(config.validate(), Err(LshError::InvalidRates { .. })));
    }

    #[test]
    fn redraw_ignores_configured_probability() {
        let config = LshConfig::default()
            .with_p(0.9)
            .with_policy(ParameterPolicy::Redraw);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn narrow_domain_applies_to_p() {
        let config = LshConfig::dictionary()
            .with_policy(ParameterPolicy::Shared)
            .with_p(0.2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let mut config = LshConfig::default();
        config.corpus_size = 0;
        assert!(matches!(config.validate(), Err(LshError::Config(_))));

        let mut config = LshConfig::default();
        config.p_upper = 0.5;
        assert!(matches!(config.validate(), Err(LshError::Config(_))));

        let config = LshConfig::default().with_verify(VerifyConfig {
            min_radius: 3,
            max_radius: 1,
            amplification: 5,
        });
        assert!(matches!(config.validate(), Err(LshError::Config(_))));
    }

    #[test]
    fn verify_config_rejects_empty_range_and_zero_amplification() {
        assert!(VerifyConfig::default().validate().is_ok());
        let zero = VerifyConfig {
            min_radius: 1,
            max_radius: 2,
            amplification: 0,
        };
        assert!(matches!(zero.validate(), Err(LshError::Config(_))));
        assert!(matches!(
            LshConfig::default().with_verify(zero).validate(),
            Err(LshError::Config(_))
        ));
        let inverted = VerifyConfig {
            min_radius: 3,
            max_radius: 1,
            amplification: 5,
        };
        assert!(matches!(inverted.validate(), Err(LshError::Config(_))));
    }

    #[test]
    fn fit_corpus_counts_symbols() {
        let corpus = ["ab", "abcd$", "é"];
        let config = LshConfig::default().fit_corpus(&corpus);
        assert_eq!(config.max_string_len, 5);
        assert_eq!(config.corpus_size, 3);

        let empty: [&str; 0] = [];
        let config = LshConfig::default().fit_corpus(&empty);
        assert_eq!(config.max_string_len, 1);
        assert_eq!(config.corpus_size, 1);
    }

    #[test]
    fn json_round_trip_with_defaults() {
        let config = LshConfig::dna().with_seed(42);
        let json = config.to_json().unwrap();
        assert_eq!(LshConfig::from_json(&json).unwrap(), config);

        let partial = LshConfig::from_json(r#"{"ensemble_size": 3, "oracle": "algebraic"}"#)
            .unwrap();
        assert_eq!(partial.ensemble_size, 3);
        assert_eq!(partial.oracle, OracleStrategy::Algebraic);
        assert_eq!(partial.alphabet, Alphabet::lowercase());
    }

    #[test]
    fn invalid_json_config_is_rejected() {
        assert!(matches!(
            LshConfig::from_json("{"),
            Err(LshError::Serialization(_))
        ));
        assert!(matches!(
            LshConfig::from_json(r#"{"ensemble_size": 0}"#),
            Err(LshError::EmptyEnsemble)
        ));
    }

    #[test]
    fn transcript_bound_uses_d_and_n() {
        let config = LshConfig::default();
        let params = config.resolve_params().unwrap();
        let l = config.transcript_bound(&params);
        let expected = 800.0 / (1.0 - params.pa) + 6.0 * 100f64.ln();
        assert!((l - expected).abs() < 1e-9);
    }
}
