use crate::closure::{ClosureConfig, SolveStats};
use crate::matrix::SymbolMatrices;

/// The mutable state of a closure computation.
#[derive(Clone, Debug)]
pub struct ClosureState {
    pub iteration: usize,
    /// The closed relation `M`: every pair derived and confirmed so far.
    pub closed: SymbolMatrices,
    /// The front `Δ`: pairs discovered in the previous iteration that the
    /// next iteration must propagate through the rules.
    pub front: SymbolMatrices,
    pub stats: SolveStats,
}

impl ClosureState {
    /// Seed the front with every rule contribution that does not depend on
    /// previously derived pairs:
    ///
    /// - epsilon rules `A → ε` contribute the identity relation,
    /// - unary rules `A → t` with a terminal label contribute the graph's
    ///   `t`-matrix,
    /// - double-terminal rules `A → s t` contribute the one-off product of
    ///   the two graph matrices (the operands are immutable, so this never
    ///   has to be revisited).
    ///
    /// The closed relation starts empty; the naive engine absorbs the seed
    /// on its first step, the delta engines propagate it.
    pub fn initial(config: &ClosureConfig) -> ClosureState {
        let size = config.size();
        let mut front = SymbolMatrices::new(size);

        for &lhs in config.grammar.epsilon_rules() {
            front.absorb(lhs, crate::matrix::BoolMatrix::identity(size));
        }

        for &(lhs, rhs) in config.grammar.unary_rules() {
            if !config.grammar.is_nonterminal(rhs) {
                if let Some(matrix) = config.graph.matrix(rhs) {
                    front.union_into(lhs, matrix);
                }
            }
        }

        let mut stats = SolveStats::default();
        for &(lhs, left, right) in config.grammar.buckets().double_terminal() {
            let (Some(left), Some(right)) = (config.graph.matrix(left), config.graph.matrix(right))
            else {
                continue;
            };
            let product = left.multiply(right);
            stats.multiplications += 1;
            if !product.is_empty() {
                front.absorb(lhs, product);
            }
        }

        ClosureState {
            iteration: 0,
            closed: SymbolMatrices::new(size),
            front,
            stats,
        }
    }
}
