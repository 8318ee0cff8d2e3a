// Edit-LSH: Ensemble
//
// K independently sampled hash family instances, each with its own bucket
// index. Queries OR-amplify: an item matches if any single instance puts it
// in the query's bucket. Recall goes up, so do false positives; an exact
// edit-distance check downstream is expected to filter them.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::bucket::BucketIndex;
use crate::core::config::{LshConfig, ParameterPolicy};
use crate::core::family::HashFamily;
use crate::core::params::ProbabilityParams;
use crate::core::transcript::Transcript;
use crate::core::types::ItemId;
use crate::error::{LshError, Result};
use crate::workload::CorpusSource;

/// One sampled instance together with the corpus bucketed under it.
#[derive(Debug)]
pub struct EnsembleMember {
    family: HashFamily,
    index: BucketIndex,
}

impl EnsembleMember {
    pub fn family(&self) -> &HashFamily {
        &self.family
    }

    pub fn index(&self) -> &BucketIndex {
        &self.index
    }

    /// Corpus items sharing the query's bucket under this instance. An
    /// incomplete query transcript matches nothing.
    pub fn matches(&self, query: &str) -> &[ItemId] {
        match self.family.hash_str(query) {
            transcript @ Transcript::Complete(_) => self.index.bucket(&transcript),
            Transcript::Incomplete => &[],
        }
    }
}

/// K independent hash family instances over one corpus.
#[derive(Debug)]
pub struct Ensemble {
    members: Vec<EnsembleMember>,
    policy: ParameterPolicy,
    shared: Option<ProbabilityParams>,
    corpus_len: usize,
    seed: u64,
}

/// Independent RNG for member `member`, derived from the master seed.
fn member_rng(master: u64, member: usize) -> StdRng {
    StdRng::seed_from_u64(xxh3_64_with_seed(&master.to_le_bytes(), member as u64))
}

impl Ensemble {
    /// Samples `config.ensemble_size` instances and buckets `corpus` under
    /// each of them.
    ///
    /// Members are built in parallel. Each one owns an RNG derived from the
    /// master seed and its position, so no oracle state is shared and a
    /// fixed `config.seed` reproduces the whole ensemble.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config` before any hashing starts.
    #[tracing::instrument(skip(corpus, config), fields(corpus_len = corpus.len(), ensemble_size = config.ensemble_size))]
    pub fn build<S: AsRef<str> + Sync>(corpus: &[S], config: &LshConfig) -> Result<Self> {
        config.validate()?;
        let shared = match config.policy {
            ParameterPolicy::Shared => Some(config.resolve_params()?),
            ParameterPolicy::Redraw => None,
        };
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let alphabet = Arc::new(config.alphabet.clone());

        let members = (0..config.ensemble_size)
            .into_par_iter()
            .map(|i| {
                let mut rng = member_rng(seed, i);
                let params = match shared {
                    Some(params) => params,
                    None => ProbabilityParams::sample(&mut rng, config.p_upper)?,
                };
                let family = HashFamily::sample(&mut rng, config, Arc::clone(&alphabet), params);
                let index = BucketIndex::build(corpus, &family);
                tracing::debug!(
                    member = i,
                    p = params.p,
                    buckets = index.len(),
                    incomplete = index.incomplete(),
                    "ensemble member built"
                );
                Ok(EnsembleMember { family, index })
            })
            .collect::<Result<Vec<_>>>()?;

        let incomplete: usize = members.iter().map(|m| m.index.incomplete()).sum();
        tracing::info!(
            members = members.len(),
            incomplete_transcripts = incomplete,
            "ensemble built"
        );

        Ok(Self {
            members,
            policy: config.policy,
            shared,
            corpus_len: corpus.len(),
            seed,
        })
    }

    /// Loads the corpus from `source` and builds over it.
    pub fn build_from_source<C: CorpusSource + ?Sized>(
        source: &C,
        config: &LshConfig,
    ) -> Result<(Vec<String>, Self)> {
        let corpus = source.load()?;
        let ensemble = Self::build(&corpus, config)?;
        Ok((corpus, ensemble))
    }

    /// Corpus items sharing a bucket with `query` under at least one member.
    #[tracing::instrument(skip(self), fields(query_len = query.len()))]
    pub fn query(&self, query: &str) -> BTreeSet<ItemId> {
        self.members
            .par_iter()
            .map(|member| member.matches(query).iter().copied().collect::<BTreeSet<_>>())
            .reduce(BTreeSet::new, |mut acc, found| {
                acc.extend(found);
                acc
            })
    }

    /// Fails unless `len` matches the corpus the ensemble was built over.
    pub(crate) fn check_corpus_len(&self, len: usize) -> Result<()> {
        if len != self.corpus_len {
            return Err(LshError::Corpus(format!(
                "corpus has {len} items but the ensemble was built over {}",
                self.corpus_len
            )));
        }
        Ok(())
    }

    /// Number of members that bucket items `a` and `b` together.
    pub fn collisions(&self, a: ItemId, b: ItemId) -> usize {
        self.members
            .iter()
            .filter(|member| member.index.same_bucket(a, b))
            .count()
    }

    pub fn members(&self) -> &[EnsembleMember] {
        &self.members
    }

    /// Number of members (K).
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn policy(&self) -> ParameterPolicy {
        self.policy
    }

    /// The probabilities every member shares, `None` under `Redraw`.
    pub fn shared_params(&self) -> Option<&ProbabilityParams> {
        self.shared.as_ref()
    }

    /// Number of corpus items the ensemble was built over.
    pub fn corpus_len(&self) -> usize {
        self.corpus_len
    }

    /// Master seed the members were derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
