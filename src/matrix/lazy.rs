use crate::grammar::Symbol;
use crate::matrix::{BoolMatrix, SymbolMatrices};
use log::trace;
use rustc_hash::FxHashMap;

/// A multiset of matrices `{M₁, …, Mₚ}` standing for their union, with the
/// actual additions deferred until they become profitable.
///
/// The members are kept sorted by `nvals` under the *sparsity-gap invariant*:
/// for the gap factor `b > 1`, every neighbouring pair satisfies
/// `b · nvals(Mᵢ) < nvals(Mᵢ₊₁)`. Because the sequence is ascending this
/// implies the same bound for every pair, so a newly added matrix only ever
/// merges with members of comparable magnitude and large unions are delayed
/// until enough small contributions have accumulated to amortize them.
pub struct LazyMatrixSet {
    size: usize,
    gap: f64,
    /// Members sorted ascending by `nvals`, paired with their cached counts.
    members: Vec<(u64, BoolMatrix)>,
}

impl LazyMatrixSet {
    /// Create an empty set over `size × size` matrices with gap factor `gap`.
    ///
    /// # Panics
    ///
    /// Panics unless `gap > 1`; a gap of at most one would force every add
    /// to merge immediately, which is just eager addition with extra steps.
    pub fn new(size: usize, gap: f64) -> LazyMatrixSet {
        assert!(gap > 1.0, "sparsity gap factor must exceed 1, got {gap}");
        LazyMatrixSet {
            size,
            gap,
            members: Vec::new(),
        }
    }

    /// Add a matrix to the set. Empty matrices are ignored; otherwise a deep
    /// copy is inserted and the invariant is restored by merging.
    pub fn add(&mut self, matrix: &BoolMatrix) {
        let nvals = matrix.nvals();
        if nvals == 0 {
            return;
        }
        let position = self
            .members
            .partition_point(|(count, _)| *count < nvals);
        self.members.insert(position, (nvals, matrix.clone()));
        self.restore_invariant();
    }

    /// Merge members until every neighbouring pair respects the gap again.
    ///
    /// Each merge replaces two members by their union, so the member count
    /// strictly decreases and the loop terminates.
    fn restore_invariant(&mut self) {
        loop {
            let violation = self
                .members
                .windows(2)
                .position(|pair| self.gap * pair[0].0 as f64 >= pair[1].0 as f64);
            let Some(i) = violation else {
                return;
            };

            let (_, small) = self.members.remove(i);
            let (_, large) = self.members.remove(i);
            let merged = large.union(&small);
            let merged_nvals = merged.nvals();
            trace!(
                "Merged lazy members into one with {} pairs ({} remain).",
                merged_nvals,
                self.members.len() + 1
            );

            let position = self
                .members
                .partition_point(|(count, _)| *count < merged_nvals);
            self.members.insert(position, (merged_nvals, merged));
        }
    }

    /// Fold the members into a single concrete matrix.
    pub fn materialize(&self) -> BoolMatrix {
        let mut result = BoolMatrix::zero(self.size);
        for (_, member) in &self.members {
            result.union_with(member);
        }
        result
    }

    /// Number of members currently held.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of the members' `nvals` (an upper bound on the union's `nvals`).
    pub fn total_nvals(&self) -> u64 {
        self.members.iter().map(|(count, _)| *count).sum()
    }

    /// The cached member counts, ascending. Exposed for invariant checks.
    pub fn member_nvals(&self) -> Vec<u64> {
        self.members.iter().map(|(count, _)| *count).collect()
    }
}

/// A [`SymbolMatrices`] analogue whose per-symbol values are lazy sets.
///
/// The optimized closure engines accumulate every product contribution here
/// symbolically and only materialize once per iteration, right before the
/// difference step.
pub struct LazySymbolMatrices {
    size: usize,
    gap: f64,
    sets: FxHashMap<Symbol, LazyMatrixSet>,
}

impl LazySymbolMatrices {
    pub fn new(size: usize, gap: f64) -> LazySymbolMatrices {
        LazySymbolMatrices {
            size,
            gap,
            sets: FxHashMap::default(),
        }
    }

    /// Add `matrix` to the set for `symbol` (a symbolic OR).
    pub fn add(&mut self, symbol: Symbol, matrix: &BoolMatrix) {
        self.sets
            .entry(symbol)
            .or_insert_with(|| LazyMatrixSet::new(self.size, self.gap))
            .add(matrix);
    }

    /// True iff `symbol` has at least one (non-empty) member.
    pub fn has(&self, symbol: Symbol) -> bool {
        self.sets.get(&symbol).map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Materialize every symbol into a concrete [`SymbolMatrices`].
    pub fn materialize_all(&self) -> SymbolMatrices {
        let mut result = SymbolMatrices::new(self.size);
        for (&symbol, set) in &self.sets {
            if !set.is_empty() {
                result.absorb(symbol, set.materialize());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolTable;
    use std::collections::BTreeSet;

    fn assert_gap_invariant(set: &LazyMatrixSet, gap: f64) {
        let counts = set.member_nvals();
        for pair in counts.windows(2) {
            assert!(
                gap * (pair[0] as f64) < pair[1] as f64,
                "gap invariant violated: {} vs {} (gap {})",
                pair[0],
                pair[1],
                gap
            );
        }
    }

    /// A matrix with `count` pairs in row 0.
    fn row_matrix(size: usize, count: u32) -> BoolMatrix {
        let pairs: Vec<(u32, u32)> = (0..count).map(|c| (0, c)).collect();
        BoolMatrix::from_pairs(size, &pairs)
    }

    #[test]
    fn empty_add_is_ignored() {
        let mut set = LazyMatrixSet::new(8, 2.0);
        set.add(&BoolMatrix::zero(8));
        assert!(set.is_empty());
        assert!(set.materialize().is_empty());
    }

    #[test]
    fn materialize_equals_union_of_adds() {
        let mut set = LazyMatrixSet::new(8, 2.0);
        let a = BoolMatrix::from_pairs(8, &[(0, 1), (2, 3)]);
        let b = BoolMatrix::from_pairs(8, &[(2, 3), (4, 5)]);
        let c = BoolMatrix::from_pairs(8, &[(7, 0)]);
        set.add(&a);
        set.add(&b);
        set.add(&c);

        let expected = a.union(&b).union(&c);
        assert_eq!(set.materialize(), expected);
    }

    #[test]
    fn invariant_holds_after_every_add() {
        let gap = 2.0;
        let mut set = LazyMatrixSet::new(64, gap);
        for count in [1u32, 1, 2, 3, 5, 8, 13, 21, 34, 55] {
            set.add(&row_matrix(64, count));
            assert_gap_invariant(&set, gap);
        }
    }

    #[test]
    fn comparable_magnitudes_merge() {
        let mut set = LazyMatrixSet::new(16, 2.0);
        set.add(&row_matrix(16, 4));
        set.add(&row_matrix(16, 5));
        // 2 * 4 >= 5, so the two members must have merged into one.
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distant_magnitudes_stay_separate() {
        let mut set = LazyMatrixSet::new(64, 2.0);
        set.add(&row_matrix(64, 2));
        let pairs: Vec<(u32, u32)> = (0..10).map(|c| (1, c)).collect();
        set.add(&BoolMatrix::from_pairs(64, &pairs));
        // 2 * 2 < 10: no merge required.
        assert_eq!(set.len(), 2);
    }

    #[test]
    #[should_panic(expected = "gap factor must exceed 1")]
    fn gap_of_one_is_rejected() {
        LazyMatrixSet::new(4, 1.0);
    }

    #[test]
    fn lazy_symbol_matrices_materialize_all() {
        let mut table = SymbolTable::new();
        let a = table.intern("A");
        let b = table.intern("B");

        let mut lazy = LazySymbolMatrices::new(8, 2.0);
        lazy.add(a, &BoolMatrix::from_pairs(8, &[(0, 1)]));
        lazy.add(a, &BoolMatrix::from_pairs(8, &[(1, 2)]));
        lazy.add(b, &BoolMatrix::zero(8));

        assert!(lazy.has(a));
        assert!(!lazy.has(b));

        let concrete = lazy.materialize_all();
        let a_pairs: BTreeSet<_> = concrete.get(a).unwrap().pairs().collect();
        assert_eq!(a_pairs, BTreeSet::from([(0, 1), (1, 2)]));
        assert!(!concrete.has(b));
    }
}
