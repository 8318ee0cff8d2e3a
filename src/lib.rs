// Edit-LSH
//
// Locality-sensitive hashing for edit distance: a randomized transducer hash
// family, multi-instance bucketing with OR-amplified queries, candidate pair
// generation, and an empirical check of the family's collision bounds.

pub mod core;
pub mod edit;
pub mod error;
pub mod index;
pub mod verify;
pub mod workload;

pub use crate::core::alphabet::{Alphabet, BLANK, OUT_OF_BAND};
pub use crate::core::config::{LshConfig, ParameterPolicy, ProbabilitySpec, VerifyConfig};
pub use crate::core::family::HashFamily;
pub use crate::core::oracle::{AlgebraicOracle, Oracle, OracleStrategy, RandomOracle, TableOracle};
pub use crate::core::params::{max_transcript_len, ProbabilityParams, P_MAX};
pub use crate::core::transcript::{Trace, Transcript};
pub use crate::core::types::{CandidatePair, ItemId};
pub use crate::edit::{EditOp, EditOracle, Levenshtein};
pub use crate::error::{LshError, Result};
pub use crate::index::bucket::{BucketIndex, BucketStats};
pub use crate::index::ensemble::{Ensemble, EnsembleMember};
pub use crate::verify::{
    BoundRecord, BoundVerifier, DistanceBin, DistanceHistogram, Observation, PairProbe, Regime,
    VerificationReport, Verdict,
};
pub use crate::workload::{perturb, recommended_ensemble_size, CorpusSource};
