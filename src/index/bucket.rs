// Edit-LSH: Bucket Index
//
// Groups corpus items by equal transcript under one hash family instance.
// Buckets live in an arena and hold item identifiers, never strings; each
// item remembers which bucket slot (if any) it landed in.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::family::HashFamily;
use crate::core::oracle::RandomOracle;
use crate::core::transcript::Transcript;
use crate::core::types::ItemId;

/// Summary of one index's bucket distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BucketStats {
    /// Number of distinct transcripts.
    pub buckets: usize,
    /// Items with a complete transcript.
    pub indexed: usize,
    /// Items whose transcript was incomplete.
    pub incomplete: usize,
    /// Size of the largest bucket.
    pub largest_bucket: usize,
}

/// Transcript -> item identifiers, built under exactly one hash family.
#[derive(Debug, Clone, Default)]
pub struct BucketIndex {
    /// Transcript text -> bucket slot.
    slots: HashMap<String, usize>,
    /// Bucket slot -> members in ascending identifier order.
    buckets: Vec<Vec<ItemId>>,
    /// Item -> bucket slot, `None` for incomplete transcripts.
    assignment: Vec<Option<usize>>,
}

impl BucketIndex {
    /// Hashes every corpus item under `family` and buckets the complete
    /// transcripts. Transcripts are computed in parallel; insertion is in
    /// corpus order, so bucket members come out sorted.
    pub fn build<S, O>(corpus: &[S], family: &HashFamily<O>) -> Self
    where
        S: AsRef<str> + Sync,
        O: RandomOracle,
    {
        let transcripts: Vec<Transcript> = corpus
            .par_iter()
            .map(|item| family.hash_str(item.as_ref()))
            .collect();
        Self::from_transcripts(transcripts)
    }

    /// Buckets pre-computed transcripts; the i-th transcript belongs to item i.
    pub fn from_transcripts(transcripts: impl IntoIterator<Item = Transcript>) -> Self {
        let mut index = Self::default();
        for (id, transcript) in transcripts.into_iter().enumerate() {
            let slot = match transcript {
                Transcript::Complete(text) => {
                    let next = index.buckets.len();
                    let slot = *index.slots.entry(text).or_insert(next);
                    if slot == next {
                        index.buckets.push(Vec::new());
                    }
                    index.buckets[slot].push(id);
                    Some(slot)
                }
                Transcript::Incomplete => None,
            };
            index.assignment.push(slot);
        }
        index
    }

    /// Members sharing `transcript`; empty for unknown or incomplete ones.
    pub fn bucket(&self, transcript: &Transcript) -> &[ItemId] {
        transcript
            .as_str()
            .and_then(|text| self.slots.get(text))
            .map(|&slot| self.buckets[slot].as_slice())
            .unwrap_or(&[])
    }

    /// The bucket item `id` landed in, `None` if its transcript was
    /// incomplete or `id` is outside the corpus.
    pub fn bucket_of(&self, id: ItemId) -> Option<&[ItemId]> {
        self.assignment
            .get(id)
            .copied()
            .flatten()
            .map(|slot| self.buckets[slot].as_slice())
    }

    /// Whether both items sit in the same bucket.
    pub fn same_bucket(&self, a: ItemId, b: ItemId) -> bool {
        match (self.assignment.get(a), self.assignment.get(b)) {
            (Some(Some(x)), Some(Some(y))) => x == y,
            _ => false,
        }
    }

    /// All buckets as (transcript, members), in no particular order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[ItemId])> + '_ {
        self.slots
            .iter()
            .map(|(text, &slot)| (text.as_str(), self.buckets[slot].as_slice()))
    }

    /// Member lists only, in slot order.
    pub(crate) fn member_lists(&self) -> &[Vec<ItemId>] {
        &self.buckets
    }

    /// Number of distinct buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of corpus items seen at build time.
    pub fn corpus_len(&self) -> usize {
        self.assignment.len()
    }

    /// Items left out because their transcript was incomplete.
    pub fn incomplete(&self) -> usize {
        self.assignment.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn stats(&self) -> BucketStats {
        let incomplete = self.incomplete();
        BucketStats {
            buckets: self.buckets.len(),
            indexed: self.assignment.len() - incomplete,
            incomplete,
            largest_bucket: self.buckets.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}
