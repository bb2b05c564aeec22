//! Context-free graph reachability (CFL-reachability) over sparse boolean
//! matrices.
//!
//! Given an edge-labeled directed graph and a context-free grammar in
//! (extended) Chomsky normal form, [`closure::solve`] computes, for the
//! grammar's start nonterminal `S`, the relation of vertex pairs `(u, v)`
//! such that some path `u → v` spells a word derivable from `S`.
//!
//! The solver is a family of fixed-point engines over one boolean matrix per
//! nonterminal: a naive closure, an incremental (front/delta) closure, and
//! optimized variants that skip products with an empty operand and defer
//! matrix additions behind a sparsity-gap invariant. [`closure::Strategy`]
//! picks an engine from the input characteristics, or callers can force one.

pub mod closure;
pub mod computation;
pub mod error;
pub mod grammar;
pub mod graph;
pub mod matrix;

#[cfg(test)]
mod test_utils;

use crate::matrix::BoolMatrix;

/// A utility method for printing useful metadata of a boolean matrix.
fn log_matrix(matrix: &BoolMatrix) -> String {
    format!("pairs={}; dim={}", matrix.nvals(), matrix.size())
}

/// Extract the "simple name" of a type argument at compile time.
///
/// In the future, this should be a `const fn`, but `type_name` and `unwrap_or`
/// are not yet stabilized as `const` functions (even though they probably are).
fn simple_type_name<T>() -> &'static str {
    std::any::type_name::<T>().split("::").last().unwrap_or("?")
}
