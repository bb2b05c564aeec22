//! Sparse boolean matrices and the per-nonterminal matrix families built on
//! top of them.
//!
//! [`BoolMatrix`] is a square boolean relation on `[0, n) × [0, n)` stored as
//! one compressed bitmap per row. [`SymbolMatrices`] maps grammar symbols to
//! matrices and provides the set operations the closure engines iterate
//! (union, difference, equality). [`LazyMatrixSet`] and
//! [`LazySymbolMatrices`] represent a union of matrices symbolically,
//! deferring the actual bitmap additions behind a sparsity-gap invariant.

mod bool_matrix;
mod lazy;
mod symbol_matrices;

pub use bool_matrix::BoolMatrix;
pub use lazy::{LazyMatrixSet, LazySymbolMatrices};
pub use symbol_matrices::SymbolMatrices;
