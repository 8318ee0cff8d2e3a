// Edit-LSH: Candidate Pairs
//
// Every bucket with two or more members yields all of its (i, j), i < j.
// Across an ensemble the per-member pair sets are merged and deduplicated,
// so a pair that collides under many members is reported once.
//
// Candidates are only possibly similar. The exact pass runs an edit oracle
// over them: full edit scripts, or a radius filter that drops false
// positives from pairs and query results.

use std::collections::BTreeSet;

use rayon::prelude::*;

use super::bucket::BucketIndex;
use super::ensemble::Ensemble;
use crate::core::types::{CandidatePair, ItemId};
use crate::edit::{EditOp, EditOracle};
use crate::error::Result;

fn bucket_pairs(members: &[usize], out: &mut BTreeSet<CandidatePair>) {
    for (offset, &a) in members.iter().enumerate() {
        for &b in &members[offset + 1..] {
            if let Some(pair) = CandidatePair::new(a, b) {
                out.insert(pair);
            }
        }
    }
}

impl BucketIndex {
    /// Candidate pairs produced by this index alone.
    pub fn candidate_pairs(&self) -> BTreeSet<CandidatePair> {
        let mut pairs = BTreeSet::new();
        for members in self.member_lists().iter().filter(|m| m.len() >= 2) {
            bucket_pairs(members, &mut pairs);
        }
        pairs
    }
}

impl Ensemble {
    /// Deduplicated union of every member's candidate pairs.
    ///
    /// Members are scanned in parallel; the partial sets are merged pairwise.
    #[tracing::instrument(skip(self), fields(ensemble_size = self.len()))]
    pub fn candidate_pairs(&self) -> BTreeSet<CandidatePair> {
        let pairs = self
            .members()
            .par_iter()
            .map(|member| member.index().candidate_pairs())
            .reduce(BTreeSet::new, |mut acc, mut found| {
                if acc.len() < found.len() {
                    std::mem::swap(&mut acc, &mut found);
                }
                acc.extend(found);
                acc
            });
        tracing::debug!(pairs = pairs.len(), "candidate pairs collected");
        pairs
    }

    /// Edit script from the first to the second item of every candidate
    /// pair, in pair order.
    ///
    /// # Errors
    ///
    /// Returns `LshError::Corpus` if `corpus` is not the corpus the ensemble
    /// was built over.
    pub fn candidate_scripts<S, E>(
        &self,
        corpus: &[S],
        oracle: &E,
    ) -> Result<Vec<(CandidatePair, Vec<EditOp>)>>
    where
        S: AsRef<str> + Sync,
        E: EditOracle,
    {
        self.check_corpus_len(corpus.len())?;
        let pairs: Vec<CandidatePair> = self.candidate_pairs().into_iter().collect();
        Ok(pairs
            .into_par_iter()
            .map(|pair| {
                let (i, j) = pair.as_tuple();
                (pair, oracle.edit_script(corpus[i].as_ref(), corpus[j].as_ref()))
            })
            .collect())
    }

    /// Candidate pairs whose true edit distance is at most `radius`.
    ///
    /// # Errors
    ///
    /// Returns `LshError::Corpus` on a corpus mismatch.
    pub fn candidates_within<S, E>(
        &self,
        corpus: &[S],
        radius: usize,
        oracle: &E,
    ) -> Result<BTreeSet<CandidatePair>>
    where
        S: AsRef<str> + Sync,
        E: EditOracle,
    {
        self.check_corpus_len(corpus.len())?;
        let pairs: Vec<CandidatePair> = self.candidate_pairs().into_iter().collect();
        Ok(pairs
            .into_par_iter()
            .filter(|pair| {
                let (i, j) = pair.as_tuple();
                oracle.distance(corpus[i].as_ref(), corpus[j].as_ref()) <= radius
            })
            .collect())
    }

    /// Query matches whose true edit distance to `query` is at most `radius`.
    ///
    /// # Errors
    ///
    /// Returns `LshError::Corpus` on a corpus mismatch.
    pub fn query_within<S, E>(
        &self,
        query: &str,
        corpus: &[S],
        radius: usize,
        oracle: &E,
    ) -> Result<BTreeSet<ItemId>>
    where
        S: AsRef<str>,
        E: EditOracle,
    {
        self.check_corpus_len(corpus.len())?;
        Ok(self
            .query(query)
            .into_iter()
            .filter(|&id| oracle.distance(query, corpus[id].as_ref()) <= radius)
            .collect())
    }
}
