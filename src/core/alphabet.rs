// Edit-LSH: Alphabet
//
// Ordered symbol set with a terminator. Every recognised symbol has a stable
// 1-based index; anything outside the set maps to the out-of-band index 0.

use serde::{Deserialize, Serialize};

use crate::error::{LshError, Result};

/// Marker written into transcripts for random insertions and substitutions.
pub const BLANK: char = '\u{22A5}';

/// Reserved index for symbols outside the alphabet.
pub const OUT_OF_BAND: usize = 0;

/// Ordered set of recognised symbols, terminator last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<char>,
    terminator: char,
}

impl Alphabet {
    /// Builds an alphabet from `symbols` followed by `terminator`.
    ///
    /// The terminator is appended unless `symbols` already ends with it.
    ///
    /// # Errors
    ///
    /// Returns `LshError::Alphabet` if no symbols besides the terminator are
    /// given, if a symbol repeats, or if the blank marker is used as a symbol.
    pub fn new(symbols: impl IntoIterator<Item = char>, terminator: char) -> Result<Self> {
        let mut ordered: Vec<char> = symbols.into_iter().collect();
        if ordered.last() != Some(&terminator) {
            ordered.push(terminator);
        }
        if ordered.len() < 2 {
            return Err(LshError::Alphabet(
                "alphabet needs at least one symbol besides the terminator".to_string(),
            ));
        }
        if ordered.contains(&BLANK) {
            return Err(LshError::Alphabet(format!(
                "blank marker {BLANK} cannot be an alphabet symbol"
            )));
        }
        for (i, c) in ordered.iter().enumerate() {
            if ordered[..i].contains(c) {
                return Err(LshError::Alphabet(format!("duplicate symbol {c:?}")));
            }
        }
        Ok(Self {
            symbols: ordered,
            terminator,
        })
    }

    /// Lowercase latin letters plus `$`.
    pub fn lowercase() -> Self {
        Self {
            symbols: ('a'..='z').chain(std::iter::once('$')).collect(),
            terminator: '$',
        }
    }

    /// DNA bases `A`, `T`, `C`, `G` plus `$`.
    pub fn dna() -> Self {
        Self {
            symbols: vec!['A', 'T', 'C', 'G', '$'],
            terminator: '$',
        }
    }

    /// Stable index of `symbol` in `[1, len]`, or `OUT_OF_BAND` for a miss.
    #[inline]
    pub fn index_of(&self, symbol: char) -> usize {
        self.symbols
            .iter()
            .position(|&s| s == symbol)
            .map_or(OUT_OF_BAND, |i| i + 1)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol) != OUT_OF_BAND
    }

    /// Number of symbols, terminator included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn terminator(&self) -> char {
        self.terminator
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Re-checks the invariants of a deserialized alphabet.
    pub(crate) fn validate(&self) -> Result<()> {
        let rebuilt = Self::new(self.symbols.iter().copied(), self.terminator)?;
        if rebuilt.symbols.len() != self.symbols.len() {
            return Err(LshError::Alphabet(format!(
                "terminator {:?} must be the last symbol",
                self.terminator
            )));
        }
        Ok(())
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::lowercase()
    }
}
