// Edit-LSH: Transcripts
//
// A transcript is either complete (the whole input was consumed before the
// length bound) or incomplete. Incomplete transcripts carry no similarity
// information and never enter a bucket.

use serde::{Deserialize, Serialize};

use super::alphabet::BLANK;

/// Result of hashing one string under one hash family instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transcript {
    /// Full transcript over the alphabet plus the blank marker.
    Complete(String),
    /// The length bound was hit before the input was consumed.
    Incomplete,
}

impl Transcript {
    pub fn is_complete(&self) -> bool {
        matches!(self, Transcript::Complete(_))
    }

    /// Transcript text, `None` when incomplete.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Transcript::Complete(s) => Some(s),
            Transcript::Incomplete => None,
        }
    }

    /// Length in symbols (not bytes), `None` when incomplete.
    pub fn symbol_len(&self) -> Option<usize> {
        self.as_str().map(|s| s.chars().count())
    }
}

/// Raw transducer run, kept even when the run did not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Emitted symbols, in order.
    pub symbols: String,
    /// Number of emitted symbols.
    pub emitted: usize,
    /// Number of input symbols consumed.
    pub consumed: usize,
    /// Whether the whole input was consumed.
    pub complete: bool,
}

impl Trace {
    /// Number of blank markers in the run.
    pub fn blanks(&self) -> usize {
        self.symbols.chars().filter(|&c| c == BLANK).count()
    }

    pub fn into_transcript(self) -> Transcript {
        if self.complete {
            Transcript::Complete(self.symbols)
        } else {
            Transcript::Incomplete
        }
    }
}
