// Edit-LSH: Edit-Distance Oracle
//
// Ground truth for verification. An oracle turns two strings into the
// ordered list of edit operations taking the first to the second; the
// length of that list is the true edit distance.

use serde::{Deserialize, Serialize};

/// One step of an edit script. Positions are in symbols, not bytes:
/// `source` indexes the original string, `target` the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Insert { source: usize, target: usize },
    Delete { source: usize, target: usize },
    Replace { source: usize, target: usize },
}

/// Source of true edit distances.
pub trait EditOracle: Send + Sync {
    /// Ordered edit operations turning `a` into `b`.
    fn edit_script(&self, a: &str, b: &str) -> Vec<EditOp>;

    /// Number of operations in a minimal script.
    fn distance(&self, a: &str, b: &str) -> usize {
        self.edit_script(a, b).len()
    }
}

/// Unit-cost Levenshtein distance over `char`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Levenshtein {
    /// Full (len(a)+1) x (len(b)+1) cost matrix, row-major.
    fn matrix(a: &[char], b: &[char]) -> Vec<usize> {
        let width = b.len() + 1;
        let mut dp = vec![0usize; (a.len() + 1) * width];
        for (j, cell) in dp.iter_mut().take(width).enumerate() {
            *cell = j;
        }
        for i in 1..=a.len() {
            dp[i * width] = i;
            for j in 1..=b.len() {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                dp[i * width + j] = (dp[(i - 1) * width + j] + 1)
                    .min(dp[i * width + j - 1] + 1)
                    .min(dp[(i - 1) * width + j - 1] + cost);
            }
        }
        dp
    }
}

impl EditOracle for Levenshtein {
    fn edit_script(&self, a: &str, b: &str) -> Vec<EditOp> {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let width = b.len() + 1;
        let dp = Self::matrix(&a, &b);

        // Walk back from the bottom-right corner, preferring the diagonal.
        let mut ops = Vec::with_capacity(dp[a.len() * width + b.len()]);
        let (mut i, mut j) = (a.len(), b.len());
        while i > 0 || j > 0 {
            let here = dp[i * width + j];
            if i > 0 && j > 0 {
                let diag = dp[(i - 1) * width + j - 1];
                if a[i - 1] == b[j - 1] && diag == here {
                    i -= 1;
                    j -= 1;
                    continue;
                }
                if diag + 1 == here {
                    i -= 1;
                    j -= 1;
                    ops.push(EditOp::Replace { source: i, target: j });
                    continue;
                }
            }
            if i > 0 && dp[(i - 1) * width + j] + 1 == here {
                i -= 1;
                ops.push(EditOp::Delete { source: i, target: j });
            } else {
                j -= 1;
                ops.push(EditOp::Insert { source: i, target: j });
            }
        }
        ops.reverse();
        ops
    }

    fn distance(&self, a: &str, b: &str) -> usize {
        let b: Vec<char> = b.chars().collect();
        let mut row: Vec<usize> = (0..=b.len()).collect();
        for (i, ac) in a.chars().enumerate() {
            let mut prev = row[0];
            row[0] = i + 1;
            for (j, &bc) in b.iter().enumerate() {
                let temp = row[j + 1];
                let cost = usize::from(ac != bc);
                row[j + 1] = (row[j + 1] + 1).min(row[j] + 1).min(prev + cost);
                prev = temp;
            }
        }
        row[b.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays `ops` against `a`; must reproduce `b`.
    fn apply(a: &str, b: &str, ops: &[EditOp]) -> String {
        let mut out: Vec<char> = a.chars().collect();
        let target: Vec<char> = b.chars().collect();
        let mut shift: isize = 0;
        for op in ops {
            match *op {
                EditOp::Replace { source, target: t } => {
                    out[(source as isize + shift) as usize] = target[t];
                }
                EditOp::Delete { source, .. } => {
                    out.remove((source as isize + shift) as usize);
                    shift -= 1;
                }
                EditOp::Insert { source, target: t } => {
                    out.insert((source as isize + shift) as usize, target[t]);
                    shift += 1;
                }
            }
        }
        out.into_iter().collect()
    }

    #[test]
    fn known_distances() {
        let lev = Levenshtein;
        assert_eq!(lev.distance("kitten", "sitting"), 3);
        assert_eq!(lev.distance("flaw", "lawn"), 2);
        assert_eq!(lev.distance("", "abc"), 3);
        assert_eq!(lev.distance("abc", ""), 3);
        assert_eq!(lev.distance("same", "same"), 0);
    }

    #[test]
    fn script_length_is_distance() {
        let lev = Levenshtein;
        for (a, b) in [
            ("kitten", "sitting"),
            ("ACGTACGT$", "ACTACGAT$"),
            ("", "xy"),
            ("xy", ""),
            ("intention", "execution"),
        ] {
            let ops = lev.edit_script(a, b);
            assert_eq!(ops.len(), lev.distance(a, b), "{a} -> {b}");
        }
    }

    #[test]
    fn script_replays_to_target() {
        let lev = Levenshtein;
        for (a, b) in [
            ("kitten", "sitting"),
            ("sunday", "saturday"),
            ("GATTACA", "TACAG"),
            ("café", "cafe"),
            ("", "ab"),
        ] {
            let ops = lev.edit_script(a, b);
            assert_eq!(apply(a, b, &ops), b, "{a} -> {b}: {ops:?}");
        }
    }

    #[test]
    fn single_operations_are_named() {
        let lev = Levenshtein;
        assert_eq!(
            lev.edit_script("abc", "axc"),
            vec![EditOp::Replace { source: 1, target: 1 }]
        );
        assert_eq!(
            lev.edit_script("abc", "ac"),
            vec![EditOp::Delete { source: 1, target: 1 }]
        );
        assert_eq!(
            lev.edit_script("ac", "abc"),
            vec![EditOp::Insert { source: 1, target: 1 }]
        );
    }

    #[test]
    fn unicode_counts_symbols() {
        assert_eq!(Levenshtein.distance("harish", "harīṣh"), 2);
    }
}
