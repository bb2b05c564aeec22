use roaring::RoaringBitmap;

/// A square boolean relation on `[0, n) × [0, n)`.
///
/// Stored entries denote `true`; absent entries are `false`. Each row is a
/// compressed bitmap, so memory tracks the number of stored pairs rather
/// than `n²`, and row-wise union is the cheap primitive that both the
/// boolean matrix product and the element-wise operations reduce to.
///
/// All binary operations require both operands to have the same dimension.
/// Mismatched dimensions are a programmer error and panic.
#[derive(Clone, Debug, PartialEq)]
pub struct BoolMatrix {
    size: usize,
    rows: Vec<RoaringBitmap>,
}

impl BoolMatrix {
    /// An empty `size × size` matrix.
    pub fn zero(size: usize) -> BoolMatrix {
        BoolMatrix {
            size,
            rows: vec![RoaringBitmap::new(); size],
        }
    }

    /// The `size × size` identity relation `{(i, i)}`.
    pub fn identity(size: usize) -> BoolMatrix {
        let mut result = BoolMatrix::zero(size);
        for i in 0..size {
            result.rows[i].insert(i as u32);
        }
        result
    }

    /// Build a matrix from a list of `(row, col)` pairs. Duplicates are fine.
    ///
    /// # Panics
    ///
    /// Panics if any index is outside `[0, size)`.
    pub fn from_pairs(size: usize, pairs: &[(u32, u32)]) -> BoolMatrix {
        let mut result = BoolMatrix::zero(size);
        for &(row, col) in pairs {
            result.set(row, col);
        }
        result
    }

    /// The matrix dimension `n`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Exact number of stored `true` entries.
    pub fn nvals(&self) -> u64 {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }

    pub fn get(&self, row: u32, col: u32) -> bool {
        self.rows
            .get(row as usize)
            .map(|r| r.contains(col))
            .unwrap_or(false)
    }

    /// Set entry `(row, col)` to `true`.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside `[0, size)`.
    pub fn set(&mut self, row: u32, col: u32) {
        assert!(
            (row as usize) < self.size && (col as usize) < self.size,
            "index ({row}, {col}) out of range for a {n}x{n} matrix",
            n = self.size,
        );
        self.rows[row as usize].insert(col);
    }

    /// All stored `(row, col)` pairs. The order is unspecified; callers must
    /// treat the result as a set.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, cols)| cols.iter().map(move |col| (row as u32, col)))
    }

    /// Element-wise OR: `C[i,j] = A[i,j] ∨ B[i,j]`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn union(&self, other: &BoolMatrix) -> BoolMatrix {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    /// In-place element-wise OR of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn union_with(&mut self, other: &BoolMatrix) {
        self.check_dimension(other);
        for (row, other_row) in self.rows.iter_mut().zip(&other.rows) {
            *row |= other_row;
        }
    }

    /// Boolean matrix product: `C[i,j] = ∃k. A[i,k] ∧ B[k,j]`.
    ///
    /// Row `i` of the result is the union of the rows of `other` selected by
    /// the stored entries of row `i` of `self`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn multiply(&self, other: &BoolMatrix) -> BoolMatrix {
        self.check_dimension(other);
        let mut result = BoolMatrix::zero(self.size);
        for (row, out) in self.rows.iter().zip(result.rows.iter_mut()) {
            for k in row.iter() {
                *out |= &other.rows[k as usize];
            }
        }
        result
    }

    /// Pair-set difference: `C[i,j] = A[i,j] ∧ ¬B[i,j]`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn minus(&self, other: &BoolMatrix) -> BoolMatrix {
        self.check_dimension(other);
        let mut result = self.clone();
        for (row, other_row) in result.rows.iter_mut().zip(&other.rows) {
            *row -= other_row;
        }
        result
    }

    fn check_dimension(&self, other: &BoolMatrix) {
        assert_eq!(
            self.size, other.size,
            "dimension mismatch: {0}x{0} vs {1}x{1}",
            self.size, other.size,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn pair_set(matrix: &BoolMatrix) -> BTreeSet<(u32, u32)> {
        matrix.pairs().collect()
    }

    #[test]
    fn build_and_extract() {
        let m = BoolMatrix::from_pairs(4, &[(0, 1), (2, 3), (0, 1)]);
        assert_eq!(m.nvals(), 2);
        assert_eq!(pair_set(&m), BTreeSet::from([(0, 1), (2, 3)]));
        assert!(m.get(0, 1));
        assert!(!m.get(1, 0));
    }

    #[test]
    fn zero_and_identity() {
        assert!(BoolMatrix::zero(5).is_empty());
        assert_eq!(BoolMatrix::zero(0).nvals(), 0);

        let id = BoolMatrix::identity(3);
        assert_eq!(pair_set(&id), BTreeSet::from([(0, 0), (1, 1), (2, 2)]));
    }

    #[test]
    fn union_merges_pairs() {
        let a = BoolMatrix::from_pairs(3, &[(0, 1)]);
        let b = BoolMatrix::from_pairs(3, &[(1, 2), (0, 1)]);
        assert_eq!(pair_set(&a.union(&b)), BTreeSet::from([(0, 1), (1, 2)]));
    }

    #[test]
    fn multiply_composes_relations() {
        // 0 -> 1 -> 2, plus 1 -> 0.
        let a = BoolMatrix::from_pairs(3, &[(0, 1), (1, 0)]);
        let b = BoolMatrix::from_pairs(3, &[(1, 2), (0, 0)]);
        let product = a.multiply(&b);
        assert_eq!(pair_set(&product), BTreeSet::from([(0, 2), (1, 0)]));
    }

    #[test]
    fn multiply_with_empty_operand_is_empty() {
        let a = BoolMatrix::from_pairs(3, &[(0, 1), (1, 2)]);
        let empty = BoolMatrix::zero(3);
        assert!(a.multiply(&empty).is_empty());
        assert!(empty.multiply(&a).is_empty());
    }

    #[test]
    fn identity_is_multiplicative_unit() {
        let a = BoolMatrix::from_pairs(4, &[(0, 3), (2, 1), (3, 3)]);
        let id = BoolMatrix::identity(4);
        assert_eq!(a.multiply(&id), a);
        assert_eq!(id.multiply(&a), a);
    }

    #[test]
    fn minus_removes_shared_pairs() {
        let a = BoolMatrix::from_pairs(3, &[(0, 1), (1, 2), (2, 0)]);
        let b = BoolMatrix::from_pairs(3, &[(1, 2), (0, 0)]);
        assert_eq!(pair_set(&a.minus(&b)), BTreeSet::from([(0, 1), (2, 0)]));
    }

    #[test]
    fn clone_is_independent() {
        let mut a = BoolMatrix::from_pairs(3, &[(0, 1)]);
        let copy = a.clone();
        a.set(2, 2);
        assert_eq!(copy.nvals(), 1);
        assert_eq!(a.nvals(), 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        BoolMatrix::from_pairs(2, &[(0, 2)]);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn dimension_mismatch_panics() {
        let a = BoolMatrix::zero(2);
        let b = BoolMatrix::zero(3);
        let _ = a.union(&b);
    }

    prop_compose! {
        /// A random matrix over a fixed small dimension.
        fn matrix(size: usize)(pairs in prop::collection::vec(
            (0..size as u32, 0..size as u32), 0..40,
        )) -> BoolMatrix {
            BoolMatrix::from_pairs(size, &pairs)
        }
    }

    proptest! {
        #[test]
        fn union_is_commutative(a in matrix(6), b in matrix(6)) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn union_is_associative(a in matrix(6), b in matrix(6), c in matrix(6)) {
            prop_assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        }

        #[test]
        fn union_is_idempotent(a in matrix(6)) {
            prop_assert_eq!(a.union(&a), a);
        }

        #[test]
        fn multiply_distributes_over_union(a in matrix(6), b in matrix(6), c in matrix(6)) {
            prop_assert_eq!(
                a.multiply(&b.union(&c)),
                a.multiply(&b).union(&a.multiply(&c))
            );
            prop_assert_eq!(
                a.union(&b).multiply(&c),
                a.multiply(&c).union(&b.multiply(&c))
            );
        }

        #[test]
        fn multiply_is_associative(a in matrix(5), b in matrix(5), c in matrix(5)) {
            prop_assert_eq!(
                a.multiply(&b).multiply(&c),
                a.multiply(&b.multiply(&c))
            );
        }
    }
}
