// Edit-LSH: Random Oracle
//
// Supplies the reproducible pair (r1, r2) in [0,1) x [0,1) that drives one
// transducer step for a given (symbol index, output length). Two strategies
// share the contract:
//
// - Table: materialized uniform draws for every (symbol, position) cell.
//   Exact, O(|alphabet| * L) memory.
// - Algebraic: one odd multiplier M; the pair is read from the low bits of
//   M * symbol * position mod 2^32. O(1) memory, only approximately uniform.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Source of the per-step random pair for one hash family instance.
///
/// `symbol` is the alphabet index of the input character (0 for symbols
/// outside the alphabet) and `position` is the current transcript length.
/// Implementations must return the same pair for the same query for their
/// whole lifetime.
pub trait RandomOracle: Send + Sync {
    fn sample(&self, symbol: usize, position: usize) -> (f64, f64);
}

/// Oracle strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleStrategy {
    /// Fully materialized table of uniform draws.
    #[default]
    Table,
    /// Closed-form multiplicative generator.
    Algebraic,
}

/// Materialized oracle: one uniform pair per (symbol, position) cell.
///
/// Row 0 serves symbols outside the alphabet.
#[derive(Debug, Clone)]
pub struct TableOracle {
    cells: Vec<(f64, f64)>,
    width: usize,
}

impl TableOracle {
    /// Draws `(symbols + 1) * width` uniform pairs.
    ///
    /// `symbols` is the alphabet size; `width` is the number of transcript
    /// positions, normally `ceil(L)`.
    pub fn sample_new<R: Rng>(rng: &mut R, symbols: usize, width: usize) -> Self {
        let width = width.max(1);
        let cells = (0..(symbols + 1) * width)
            .map(|_| (rng.random::<f64>(), rng.random::<f64>()))
            .collect();
        Self { cells, width }
    }

    /// Number of materialized positions per symbol.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows, out-of-band row included.
    pub fn rows(&self) -> usize {
        self.cells.len() / self.width
    }
}

impl RandomOracle for TableOracle {
    #[inline]
    fn sample(&self, symbol: usize, position: usize) -> (f64, f64) {
        let row = symbol % self.rows();
        self.cells[row * self.width + position % self.width]
    }
}

/// Exclusive upper bound of the odd multiplier.
pub const MULTIPLIER_BOUND: u64 = 1 << 20;

/// Closed-form oracle keyed by a single odd multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgebraicOracle {
    multiplier: u64,
}

impl AlgebraicOracle {
    /// Draws an odd multiplier `M = 2k - 1` with `k` uniform in `[1, 2^19]`,
    /// so `M` lies in `[1, 2^20)`.
    pub fn sample_new<R: Rng>(rng: &mut R) -> Self {
        let k = rng.random_range(1..=MULTIPLIER_BOUND / 2);
        Self {
            multiplier: 2 * k - 1,
        }
    }

    /// Builds an oracle from a fixed multiplier, forcing it odd.
    pub fn with_multiplier(multiplier: u64) -> Self {
        Self {
            multiplier: (multiplier % MULTIPLIER_BOUND) | 1,
        }
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }
}

impl RandomOracle for AlgebraicOracle {
    #[inline]
    fn sample(&self, symbol: usize, position: usize) -> (f64, f64) {
        let prod = self
            .multiplier
            .wrapping_mul(symbol as u64)
            .wrapping_mul(position as u64)
            & 0xFFFF_FFFF;
        // Five least-significant bits for r1, the next five for r2.
        let r1 = (prod & 0x1F) as f64 / 32.0;
        let r2 = ((prod & 0x3FF) >> 5) as f64 / 32.0;
        (r1, r2)
    }
}

/// The oracle owned by a sampled hash family instance.
#[derive(Debug, Clone)]
pub enum Oracle {
    Table(TableOracle),
    Algebraic(AlgebraicOracle),
}

impl Oracle {
    /// Samples fresh oracle state for the given strategy.
    pub fn sample_new<R: Rng>(
        rng: &mut R,
        strategy: OracleStrategy,
        symbols: usize,
        width: usize,
    ) -> Self {
        match strategy {
            OracleStrategy::Table => Oracle::Table(TableOracle::sample_new(rng, symbols, width)),
            OracleStrategy::Algebraic => Oracle::Algebraic(AlgebraicOracle::sample_new(rng)),
        }
    }

    pub fn strategy(&self) -> OracleStrategy {
        match self {
            Oracle::Table(_) => OracleStrategy::Table,
            Oracle::Algebraic(_) => OracleStrategy::Algebraic,
        }
    }
}

impl RandomOracle for Oracle {
    #[inline]
    fn sample(&self, symbol: usize, position: usize) -> (f64, f64) {
        match self {
            Oracle::Table(table) => table.sample(symbol, position),
            Oracle::Algebraic(algebraic) => algebraic.sample(symbol, position),
        }
    }
}
