// Edit-LSH: Error Types
//
// Only malformed configuration is an error. Alphabet misses, incomplete
// transcripts, degenerate corpora and bound violations are ordinary values.

use thiserror::Error;

/// Main error type for hash family, ensemble and verification construction.
#[derive(Debug, Error)]
pub enum LshError {
    /// Configuration validation failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Probability constant outside its domain.
    #[error("Invalid probability p = {p}: must lie in (0, {upper}]")]
    InvalidProbability { p: f64, upper: f64 },

    /// Directly supplied transducer probabilities outside their ranges.
    #[error("Invalid transducer probabilities: pa = {pa} must lie in (0, 0.5], pr = {pr} must lie in (0, 1]")]
    InvalidRates { pa: f64, pr: f64 },

    /// An ensemble needs at least one hash family instance.
    #[error("Ensemble size must be at least 1")]
    EmptyEnsemble,

    /// Alphabet is empty or malformed.
    #[error("Alphabet error: {0}")]
    Alphabet(String),

    /// The corpus source could not produce its strings.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// JSON (de)serialization of configuration or reports failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LshError>;
