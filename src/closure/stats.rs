use std::fmt::{Display, Formatter};

/// Counters describing one closure run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Boolean matrix products actually performed.
    pub multiplications: u64,
    /// Products skipped because an operand was empty.
    pub skipped_products: u64,
    /// Additions parked in a lazy matrix set instead of being performed.
    pub deferred_additions: u64,
}

impl Display for SolveStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "multiplications={}; skipped={}; deferred additions={}",
            self.multiplications, self.skipped_products, self.deferred_additions
        )
    }
}
