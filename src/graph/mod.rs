//! Edge-labeled graphs decomposed into one boolean adjacency matrix per
//! label.
//!
//! The input is line-oriented: `<u> <v> <label>` with whitespace separation
//! (tabs work, so the CSV exports used by the benchmark corpora load with
//! the same code path). Comment lines (`#`) and blank lines are skipped;
//! malformed lines are skipped with a logged diagnostic, because the large
//! corpora are noisy and failing a whole run on one bad line is punitive.
//!
//! The vertex count is `1 + max` over all indices observed. The graph is
//! built once and is read-only afterwards; a label that never occurs simply
//! has no matrix and denotes the empty relation.

use crate::error::ReadError;
use crate::grammar::{Symbol, SymbolTable};
use crate::matrix::BoolMatrix;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::path::Path;

/// The label-decomposed adjacency of an edge-labeled directed graph.
#[derive(Clone, Debug)]
pub struct LabelDecomposedGraph {
    size: usize,
    matrices: FxHashMap<Symbol, BoolMatrix>,
}

impl LabelDecomposedGraph {
    /// Load a graph from a file, interning labels into `table`.
    pub fn from_file(
        path: impl AsRef<Path>,
        table: &mut SymbolTable,
    ) -> Result<LabelDecomposedGraph, ReadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReadError::FileMissing {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(LabelDecomposedGraph::parse(&text, table))
    }

    /// Parse graph text, interning labels into `table`.
    pub fn parse(text: &str, table: &mut SymbolTable) -> LabelDecomposedGraph {
        let mut edges: FxHashMap<Symbol, Vec<(u32, u32)>> = FxHashMap::default();
        let mut max_index = None::<u32>;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let parsed = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
                (Some(u), Some(v), Some(label), None) => u
                    .parse::<u32>()
                    .ok()
                    .zip(v.parse::<u32>().ok())
                    .map(|(u, v)| (u, v, label)),
                _ => None,
            };
            let Some((u, v, label)) = parsed else {
                warn!("Skipping malformed graph line: `{line}`");
                continue;
            };

            max_index = Some(max_index.unwrap_or(0).max(u).max(v));
            edges.entry(table.intern(label)).or_default().push((u, v));
        }

        let size = max_index.map(|m| m as usize + 1).unwrap_or(0);
        let matrices = edges
            .into_iter()
            .map(|(label, pairs)| (label, BoolMatrix::from_pairs(size, &pairs)))
            .collect();

        let graph = LabelDecomposedGraph { size, matrices };
        debug!(
            "Loaded graph with {} vertices, {} labels, {} edges.",
            graph.size,
            graph.matrices.len(),
            graph.edge_count()
        );
        graph
    }

    /// The vertex count `n` (matrix dimension).
    pub fn size(&self) -> usize {
        self.size
    }

    /// The adjacency matrix of `label`, if any edge carries it.
    pub fn matrix(&self, label: Symbol) -> Option<&BoolMatrix> {
        self.matrices.get(&label)
    }

    /// The labels occurring in the graph.
    pub fn labels(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.matrices.keys().copied()
    }

    /// Total number of edges across all labels.
    pub fn edge_count(&self) -> u64 {
        self.matrices.values().map(|m| m.nvals()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edges_per_label() {
        let mut table = SymbolTable::new();
        let graph = LabelDecomposedGraph::parse("0 1 a\n1 2 a\n2 3 b\n", &mut table);

        assert_eq!(graph.size(), 4);
        assert_eq!(graph.edge_count(), 3);

        let a = table.lookup("a").unwrap();
        let b = table.lookup("b").unwrap();
        assert_eq!(graph.matrix(a).unwrap().nvals(), 2);
        assert!(graph.matrix(a).unwrap().get(0, 1));
        assert!(graph.matrix(b).unwrap().get(2, 3));
    }

    #[test]
    fn size_is_one_past_max_index() {
        let mut table = SymbolTable::new();
        let graph = LabelDecomposedGraph::parse("7 2 x\n", &mut table);
        assert_eq!(graph.size(), 8);
    }

    #[test]
    fn tabs_and_comments_are_handled() {
        let mut table = SymbolTable::new();
        let graph = LabelDecomposedGraph::parse("# header\n0\t1\tload\n\n1\t0\tstore\n", &mut table);
        assert_eq!(graph.size(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut table = SymbolTable::new();
        let graph = LabelDecomposedGraph::parse(
            "0 1 a\nnot an edge\n2 x a\n3 4 b extra\n1 2 a\n",
            &mut table,
        );
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.size(), 3);
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let mut table = SymbolTable::new();
        let graph = LabelDecomposedGraph::parse("", &mut table);
        assert_eq!(graph.size(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.labels().count(), 0);
    }

    #[test]
    fn absent_label_is_empty_relation() {
        let mut table = SymbolTable::new();
        let graph = LabelDecomposedGraph::parse("0 1 a\n", &mut table);
        let missing = table.intern("missing");
        assert!(graph.matrix(missing).is_none());
    }
}
