//! Property-based tests for the edit-distance LSH.
//!
//! These tests verify invariants that should hold regardless of input:
//! - Transducer probabilities stay in range for every valid p
//! - Hashing is deterministic per instance and respects the length bound
//! - Candidate pairs are valid, canonical and deduplicated
//! - Queries with corpus members find themselves
//! - Edit scripts have the length of the edit distance

use edit_lsh::{
    Alphabet, EditOracle, Ensemble, HashFamily, Levenshtein, LshConfig, OracleStrategy,
    ParameterPolicy, ProbabilityParams, P_MAX,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn strategy_of(algebraic: bool) -> OracleStrategy {
    if algebraic {
        OracleStrategy::Algebraic
    } else {
        OracleStrategy::Table
    }
}

prop_compose! {
    fn arb_dna(max_len: usize)(bases in "[ACGT]{0,30}") -> String {
        let mut s: String = bases.chars().take(max_len).collect();
        s.push('$');
        s
    }
}

prop_compose! {
    fn arb_corpus(max_items: usize)(items in prop::collection::vec(arb_dna(12), 0..max_items)) -> Vec<String> {
        items
    }
}

mod params_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn rates_in_range(p in 1e-6f64..=P_MAX) {
            let params = ProbabilityParams::from_p(p, P_MAX).unwrap();
            prop_assert!(params.pa > 0.0 && params.pa <= 0.5 + 1e-12, "pa = {}", params.pa);
            prop_assert!(params.pr > 0.0 && params.pr <= 1.0 + 1e-12, "pr = {}", params.pr);
            prop_assert!((params.pr * (1.0 - params.pa) - params.pa).abs() < 1e-9);
        }

        #[test]
        fn p_outside_domain_rejected(p in 0.34f64..10.0) {
            prop_assert!(ProbabilityParams::from_p(p, P_MAX).is_err());
        }
    }
}

mod family_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn hashing_is_deterministic(
            seed in any::<u64>(),
            algebraic in any::<bool>(),
            word in arb_dna(30),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = LshConfig::dna()
                .fit_corpus(&[word.as_str()])
                .with_oracle(strategy_of(algebraic));
            let family = HashFamily::from_config(&mut rng, &config).unwrap();
            prop_assert_eq!(family.hash_str(&word), family.hash_str(&word));
        }

        #[test]
        fn complete_transcripts_respect_bound(
            seed in any::<u64>(),
            algebraic in any::<bool>(),
            p in 0.01f64..=P_MAX,
            word in arb_dna(30),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = LshConfig::dna()
                .fit_corpus(&[word.as_str()])
                .with_p(p)
                .with_oracle(strategy_of(algebraic));
            let family = HashFamily::from_config(&mut rng, &config).unwrap();
            let d = word.chars().count() as f64;
            let bound = 8.0 * d / (1.0 - family.params().pa);
            if let Some(len) = family.hash_str(&word).symbol_len() {
                prop_assert!(len > 0);
                prop_assert!(len as f64 <= bound.ceil(), "len {} > bound {}", len, bound);
                prop_assert!(len >= word.chars().count());
            }
        }

        #[test]
        fn trace_accounts_for_every_step(
            seed in any::<u64>(),
            word in arb_dna(30),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = LshConfig::dna().fit_corpus(&[word.as_str()]);
            let family = HashFamily::from_config(&mut rng, &config).unwrap();
            let trace = family.trace(&word);
            prop_assert_eq!(trace.symbols.chars().count(), trace.emitted);
            prop_assert!(trace.consumed <= word.chars().count());
            prop_assert_eq!(trace.complete, trace.consumed == word.chars().count());
        }
    }
}

mod ensemble_props {
    use super::*;
    use std::collections::BTreeSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn candidate_pairs_are_valid(
            seed in any::<u64>(),
            redraw in any::<bool>(),
            corpus in arb_corpus(12),
        ) {
            let policy = if redraw { ParameterPolicy::Redraw } else { ParameterPolicy::Shared };
            let config = LshConfig::default()
                .with_alphabet(Alphabet::dna())
                .fit_corpus(&corpus)
                .with_ensemble_size(8)
                .with_policy(policy)
                .with_seed(seed);
            let ensemble = Ensemble::build(&corpus, &config).unwrap();
            let pairs = ensemble.candidate_pairs();
            let tuples: BTreeSet<_> = pairs.iter().map(|p| p.as_tuple()).collect();
            prop_assert_eq!(tuples.len(), pairs.len());
            for &(i, j) in &tuples {
                prop_assert!(i < j, "({}, {}) not canonical", i, j);
                prop_assert!(j < corpus.len());
                prop_assert!(!tuples.contains(&(j, i)));
            }
        }

        #[test]
        fn identical_items_always_pair(
            seed in any::<u64>(),
            word in arb_dna(12),
            other in arb_dna(12),
        ) {
            let corpus = vec![word.clone(), other, word];
            let config = LshConfig::default()
                .with_alphabet(Alphabet::dna())
                .fit_corpus(&corpus)
                .with_ensemble_size(6)
                .with_seed(seed);
            let ensemble = Ensemble::build(&corpus, &config).unwrap();
            for member in ensemble.members() {
                if member.index().bucket_of(0).is_some() {
                    prop_assert!(member.index().same_bucket(0, 2));
                }
            }
        }

        #[test]
        fn member_query_finds_itself(
            seed in any::<u64>(),
            corpus in arb_corpus(10),
        ) {
            let config = LshConfig::default()
                .with_alphabet(Alphabet::dna())
                .fit_corpus(&corpus)
                .with_ensemble_size(4)
                .with_seed(seed);
            let ensemble = Ensemble::build(&corpus, &config).unwrap();
            for (id, item) in corpus.iter().enumerate() {
                let indexed = ensemble
                    .members()
                    .iter()
                    .any(|m| m.index().bucket_of(id).is_some());
                let found = ensemble.query(item);
                prop_assert_eq!(found.contains(&id), indexed);
                prop_assert!(found.iter().all(|&i| i < corpus.len()));
            }
        }
    }
}

mod edit_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn script_length_matches_distance(a in "[abc]{0,12}", b in "[abc]{0,12}") {
            let lev = Levenshtein;
            prop_assert_eq!(lev.edit_script(&a, &b).len(), lev.distance(&a, &b));
        }

        #[test]
        fn distance_is_symmetric(a in "[abc]{0,12}", b in "[abc]{0,12}") {
            prop_assert_eq!(Levenshtein.distance(&a, &b), Levenshtein.distance(&b, &a));
        }

        #[test]
        fn distance_bounded_by_lengths(a in "[abc]{0,12}", b in "[abc]{0,12}") {
            let d = Levenshtein.distance(&a, &b);
            let (la, lb) = (a.chars().count(), b.chars().count());
            prop_assert!(d >= la.abs_diff(lb));
            prop_assert!(d <= la.max(lb));
        }
    }
}
