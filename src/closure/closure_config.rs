use crate::grammar::{Grammar, SymbolTable};
use crate::graph::LabelDecomposedGraph;

/// A configuration object shared by every closure engine.
///
/// Holds the inputs of one `solve` call: the (classified) grammar, the
/// label-decomposed graph, and the symbol table both were interned through.
/// The graph matrices are shared immutably with the engine for the duration
/// of the computation; nothing here changes once the closure starts.
#[derive(Clone)]
pub struct ClosureConfig {
    /// The grammar whose start symbol is being queried.
    pub grammar: Grammar,
    /// The label-decomposed adjacency of the queried graph.
    pub graph: LabelDecomposedGraph,
    /// The table that interned the grammar symbols and graph labels.
    pub symbols: SymbolTable,
    /// Upper bound on closure iterations. Fixed-point theory guarantees
    /// termination well below this for well-formed inputs; exceeding it is
    /// reported as a warning and the closed-so-far relation is returned.
    pub max_iterations: usize,
    /// Gap factor `b` of the lazy addition invariant, `b > 1`.
    pub lazy_gap: f64,
}

impl ClosureConfig {
    /// Create a configuration with the default iteration cap (100) and the
    /// default gap factor `b = √n` (clamped below by 2 so tiny graphs still
    /// satisfy `b > 1`).
    pub fn new(
        grammar: Grammar,
        graph: LabelDecomposedGraph,
        symbols: SymbolTable,
    ) -> ClosureConfig {
        let lazy_gap = (graph.size() as f64).sqrt().max(2.0);
        ClosureConfig {
            grammar,
            graph,
            symbols,
            max_iterations: 100,
            lazy_gap,
        }
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Override the lazy addition gap factor.
    ///
    /// # Panics
    ///
    /// The method will panic unless `gap > 1`; smaller gaps degenerate lazy
    /// addition into eager addition with extra bookkeeping.
    pub fn with_lazy_gap(mut self, gap: f64) -> Self {
        assert!(gap > 1.0, "sparsity gap factor must exceed 1, got {gap}");
        self.lazy_gap = gap;
        self
    }

    /// The matrix dimension shared by every relation in this computation.
    pub fn size(&self) -> usize {
        self.graph.size()
    }
}
