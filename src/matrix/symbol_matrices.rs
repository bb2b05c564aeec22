use crate::grammar::Symbol;
use crate::matrix::BoolMatrix;
use rustc_hash::FxHashMap;

/// One boolean matrix per grammar symbol, over a shared dimension.
///
/// This is the working representation of the closure engines: both the
/// closed relation `M` and the front `Δ` are values of this type. Slots are
/// created on demand; a symbol without a slot (or with an empty slot) denotes
/// the empty relation, and [`SymbolMatrices::has`] treats the two uniformly.
///
/// Equality compares per-symbol pair sets and ignores empty slots, so a map
/// that merely *allocated* a matrix is equal to one that never mentioned the
/// symbol.
#[derive(Clone, Debug)]
pub struct SymbolMatrices {
    size: usize,
    matrices: FxHashMap<Symbol, BoolMatrix>,
}

impl SymbolMatrices {
    pub fn new(size: usize) -> SymbolMatrices {
        SymbolMatrices {
            size,
            matrices: FxHashMap::default(),
        }
    }

    /// The shared matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The matrix stored for `symbol`, if a slot exists (it may be empty).
    pub fn get(&self, symbol: Symbol) -> Option<&BoolMatrix> {
        self.matrices.get(&symbol)
    }

    /// The slot for `symbol`, allocating an empty matrix on first access.
    pub fn get_or_create(&mut self, symbol: Symbol) -> &mut BoolMatrix {
        self.matrices
            .entry(symbol)
            .or_insert_with(|| BoolMatrix::zero(self.size))
    }

    /// True iff `symbol` has a non-empty matrix.
    pub fn has(&self, symbol: Symbol) -> bool {
        self.matrices
            .get(&symbol)
            .map(|m| !m.is_empty())
            .unwrap_or(false)
    }

    /// OR `matrix` into the slot for `symbol`.
    pub fn union_into(&mut self, symbol: Symbol, matrix: &BoolMatrix) {
        self.get_or_create(symbol).union_with(matrix);
    }

    /// Move `matrix` into the slot for `symbol`, ORing when a slot exists.
    pub fn absorb(&mut self, symbol: Symbol, matrix: BoolMatrix) {
        match self.matrices.get_mut(&symbol) {
            Some(slot) => slot.union_with(&matrix),
            None => {
                self.matrices.insert(symbol, matrix);
            }
        }
    }

    /// Per-symbol element-wise OR of `other` into `self`.
    pub fn union_with(&mut self, other: &SymbolMatrices) {
        for (&symbol, matrix) in &other.matrices {
            self.union_into(symbol, matrix);
        }
    }

    /// Per-symbol pair-set difference `self \ other`.
    ///
    /// Symbols absent from `other` are copied verbatim. Symbols whose
    /// difference comes out empty are omitted from the result.
    pub fn difference(&self, other: &SymbolMatrices) -> SymbolMatrices {
        let mut result = SymbolMatrices::new(self.size);
        for (&symbol, matrix) in &self.matrices {
            let remaining = match other.matrices.get(&symbol) {
                Some(other_matrix) => matrix.minus(other_matrix),
                None => matrix.clone(),
            };
            if !remaining.is_empty() {
                result.matrices.insert(symbol, remaining);
            }
        }
        result
    }

    /// Remove and return the matrix stored for `symbol`.
    pub fn remove(&mut self, symbol: Symbol) -> Option<BoolMatrix> {
        self.matrices.remove(&symbol)
    }

    /// Total number of stored pairs across all symbols.
    pub fn total_nvals(&self) -> u64 {
        self.matrices.values().map(|m| m.nvals()).sum()
    }

    /// True iff every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.matrices.values().all(|m| m.is_empty())
    }

    /// The symbols with a non-empty matrix.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.matrices
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(&s, _)| s)
    }
}

impl PartialEq for SymbolMatrices {
    fn eq(&self, other: &SymbolMatrices) -> bool {
        if self.size != other.size {
            return false;
        }
        let empty = BoolMatrix::zero(self.size);
        let keys = self.matrices.keys().chain(other.matrices.keys());
        for &symbol in keys {
            let left = self.matrices.get(&symbol).unwrap_or(&empty);
            let right = other.matrices.get(&symbol).unwrap_or(&empty);
            if left != right {
                return false;
            }
        }
        true
    }
}

impl Eq for SymbolMatrices {}
