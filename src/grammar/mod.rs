//! Context-free grammars in extended Chomsky normal form.
//!
//! A grammar holds three kinds of rules: epsilon rules `A → ε`, unary rules
//! `A → B` (with `B` a nonterminal or a terminal edge label), and binary
//! rules `A → X Y` where `X` and `Y` may each be a terminal or a
//! nonterminal. A symbol is a *nonterminal* iff it appears as some rule's
//! left-hand side or is the start symbol; everything else is a terminal.
//!
//! Binary rules are partitioned into [`RuleBuckets`] once at construction,
//! since the closure engines treat each shape differently.
//!
//! The file format is line-oriented: whitespace-separated tokens, one rule
//! per line (1 token = epsilon, 2 = unary, 3 = binary), `#` comments and
//! blank lines ignored, terminated by the literal footer line `Count:`
//! followed by a line holding the start symbol.

mod symbol;
pub mod template;

pub use symbol::{Symbol, SymbolTable};

use crate::error::ReadError;
use log::warn;
use rustc_hash::FxHashSet;
use std::path::Path;

/// The four shapes of binary rules `A → X Y`, partitioned by whether each
/// right-hand symbol is a nonterminal.
#[derive(Clone, Debug, Default)]
pub struct RuleBuckets {
    /// Both right-hand symbols are nonterminals.
    cnf: Vec<(Symbol, Symbol, Symbol)>,
    /// Nonterminal followed by a terminal: `A → B t`.
    ext_left: Vec<(Symbol, Symbol, Symbol)>,
    /// Terminal followed by a nonterminal: `A → t B`.
    ext_right: Vec<(Symbol, Symbol, Symbol)>,
    /// Both right-hand symbols are terminals.
    double_terminal: Vec<(Symbol, Symbol, Symbol)>,
}

impl RuleBuckets {
    pub fn cnf(&self) -> &[(Symbol, Symbol, Symbol)] {
        &self.cnf
    }

    pub fn ext_left(&self) -> &[(Symbol, Symbol, Symbol)] {
        &self.ext_left
    }

    pub fn ext_right(&self) -> &[(Symbol, Symbol, Symbol)] {
        &self.ext_right
    }

    pub fn double_terminal(&self) -> &[(Symbol, Symbol, Symbol)] {
        &self.double_terminal
    }
}

/// A context-free grammar in extended CNF, with interned symbols and
/// pre-classified binary rules.
#[derive(Clone, Debug)]
pub struct Grammar {
    start: Symbol,
    epsilon_rules: Vec<Symbol>,
    unary_rules: Vec<(Symbol, Symbol)>,
    binary_rules: Vec<(Symbol, Symbol, Symbol)>,
    nonterminals: FxHashSet<Symbol>,
    buckets: RuleBuckets,
}

impl Grammar {
    /// Assemble a grammar from its rule lists.
    ///
    /// The nonterminal set and the binary-rule buckets are derived here,
    /// once; they stay valid because the grammar is immutable afterwards.
    pub fn from_rules(
        start: Symbol,
        epsilon_rules: Vec<Symbol>,
        unary_rules: Vec<(Symbol, Symbol)>,
        binary_rules: Vec<(Symbol, Symbol, Symbol)>,
    ) -> Grammar {
        let mut nonterminals = FxHashSet::default();
        nonterminals.insert(start);
        nonterminals.extend(epsilon_rules.iter().copied());
        nonterminals.extend(unary_rules.iter().map(|&(lhs, _)| lhs));
        nonterminals.extend(binary_rules.iter().map(|&(lhs, _, _)| lhs));

        let mut buckets = RuleBuckets::default();
        for &rule in &binary_rules {
            let (_, x, y) = rule;
            match (nonterminals.contains(&x), nonterminals.contains(&y)) {
                (true, true) => buckets.cnf.push(rule),
                (true, false) => buckets.ext_left.push(rule),
                (false, true) => buckets.ext_right.push(rule),
                (false, false) => buckets.double_terminal.push(rule),
            }
        }

        Grammar {
            start,
            epsilon_rules,
            unary_rules,
            binary_rules,
            nonterminals,
            buckets,
        }
    }

    /// Load a grammar from a file, interning symbols into `table`.
    pub fn from_file(path: impl AsRef<Path>, table: &mut SymbolTable) -> Result<Grammar, ReadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReadError::FileMissing {
            path: path.to_path_buf(),
            source,
        })?;
        Grammar::parse(&text, table).ok_or_else(|| ReadError::MissingStart {
            path: path.to_path_buf(),
        })
    }

    /// Parse grammar text, interning symbols into `table`.
    ///
    /// Returns `None` when the `Count:` footer (and hence the start symbol)
    /// is missing. Rule lines with more than three tokens are skipped with a
    /// diagnostic.
    pub fn parse(text: &str, table: &mut SymbolTable) -> Option<Grammar> {
        let mut epsilon_rules = Vec::new();
        let mut unary_rules = Vec::new();
        let mut binary_rules = Vec::new();
        let mut start = None;

        let mut lines = text.lines();
        while let Some(line) = lines.next() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "Count:" {
                start = lines
                    .by_ref()
                    .map(str::trim)
                    .find(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(|l| table.intern(l));
                break;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [lhs] => epsilon_rules.push(table.intern(lhs)),
                [lhs, rhs] => unary_rules.push((table.intern(lhs), table.intern(rhs))),
                [lhs, x, y] => {
                    binary_rules.push((table.intern(lhs), table.intern(x), table.intern(y)))
                }
                _ => warn!("Skipping malformed grammar line: `{line}`"),
            }
        }

        start.map(|start| Grammar::from_rules(start, epsilon_rules, unary_rules, binary_rules))
    }

    /// The designated start nonterminal.
    pub fn start(&self) -> Symbol {
        self.start
    }

    /// True iff `symbol` appears as a rule LHS or is the start symbol.
    pub fn is_nonterminal(&self, symbol: Symbol) -> bool {
        self.nonterminals.contains(&symbol)
    }

    pub fn epsilon_rules(&self) -> &[Symbol] {
        &self.epsilon_rules
    }

    pub fn unary_rules(&self) -> &[(Symbol, Symbol)] {
        &self.unary_rules
    }

    pub fn binary_rules(&self) -> &[(Symbol, Symbol, Symbol)] {
        &self.binary_rules
    }

    /// The binary rules partitioned by shape (memoized at construction).
    pub fn buckets(&self) -> &RuleBuckets {
        &self.buckets
    }
}
