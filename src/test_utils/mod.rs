use crate::grammar::{Grammar, SymbolTable};
use crate::graph::LabelDecomposedGraph;
use crate::matrix::BoolMatrix;

/// Initialize env_logger for tests. Safe to call multiple times.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// A parsed (grammar, graph, symbol table) triple sharing one interner.
pub struct Fixture {
    pub grammar: Grammar,
    pub graph: LabelDecomposedGraph,
    pub symbols: SymbolTable,
}

/// Parse a grammar and a graph from inline text, interning both through the
/// same symbol table (exactly how the CLI wires them up).
pub fn fixture(grammar_text: &str, graph_text: &str) -> Fixture {
    let mut symbols = SymbolTable::new();
    let grammar =
        Grammar::parse(grammar_text, &mut symbols).expect("test grammar needs a `Count:` footer");
    let graph = LabelDecomposedGraph::parse(graph_text, &mut symbols);
    Fixture {
        grammar,
        graph,
        symbols,
    }
}

/// The stored pairs of a matrix in a canonical order, for comparisons.
pub fn sorted_pairs(matrix: &BoolMatrix) -> Vec<(u32, u32)> {
    let mut pairs: Vec<(u32, u32)> = matrix.pairs().collect();
    pairs.sort_unstable();
    pairs
}
