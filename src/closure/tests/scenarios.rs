//! End-to-end reachability scenarios, each checked against every engine.
//!
//! The expected pair sets are derived by hand from the grammar semantics:
//! `(u, v)` is expected iff some path `u → v` spells a word of the grammar's
//! language.

use crate::closure::{solve, Strategy};
use crate::grammar::template;
use crate::test_utils::{fixture, init_logger, sorted_pairs};
use std::collections::BTreeSet;

/// Solve the same instance with every engine and require the expected pairs
/// from each of them.
fn check_all_engines(grammar_text: &str, graph_text: &str, expected: &[(u32, u32)]) {
    init_logger();
    let mut expected: Vec<(u32, u32)> = expected.to_vec();
    expected.sort_unstable();

    for strategy in Strategy::ALL {
        let f = fixture(grammar_text, graph_text);
        let result = solve(f.grammar, f.graph, f.symbols, strategy).unwrap();
        assert_eq!(
            sorted_pairs(&result),
            expected,
            "engine `{strategy}` disagrees with the expected pair set"
        );
    }
}

#[test]
fn an_bn_recursion() {
    // L = { aⁿ bⁿ : n ≥ 1 } over the path 0 -a> 1 -a> 2 -b> 3 -b> 4.
    // Words: "ab" along 1→2→3, "aabb" along 0→…→4.
    check_all_engines(
        "S a S1\nS1 S b\nS a b\nCount:\nS\n",
        "0 1 a\n1 2 a\n2 3 b\n3 4 b\n",
        &[(1, 3), (0, 4)],
    );
}

#[test]
fn transitive_loop() {
    // L = s⁺ over a 3-cycle: every ordered pair (including self-pairs) is
    // connected by some s-path.
    let mut expected = Vec::new();
    for u in 0..3 {
        for v in 0..3 {
            expected.push((u, v));
        }
    }
    check_all_engines(
        "S s\nS S S\nCount:\nS\n",
        "0 1 s\n1 2 s\n2 0 s\n",
        &expected,
    );
}

#[test]
fn epsilon_only_grammar_yields_identity() {
    // L = { ε }: every vertex reaches itself by the empty path.
    check_all_engines(
        "S\nCount:\nS\n",
        "0 1 x\n1 2 x\n3 4 y\n",
        &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)],
    );
}

#[test]
fn empty_language() {
    // The only rule needs `a`-edges and the graph has none.
    init_logger();
    for strategy in Strategy::ALL {
        let f = fixture("S a a\nCount:\nS\n", "0 1 b\n");
        let result = solve(f.grammar, f.graph, f.symbols, strategy).unwrap();
        assert!(
            result.is_empty(),
            "engine `{strategy}` should find no pairs"
        );
        // The empty answer is still a properly-dimensioned matrix.
        assert_eq!(result.size(), 2);
    }
}

#[test]
fn unary_chain_propagates_to_start() {
    // S → A → B → b: one edge, one pair, three hops of unary propagation.
    check_all_engines("S A\nA B\nB b\nCount:\nS\n", "0 1 b\n", &[(0, 1)]);
}

#[test]
fn template_expansion_keeps_indices_independent() {
    // Two concrete indices, 7 and 9. A `store`/`load` bracket only matches
    // within one index, so the mixed path 0 → 1 → 6 must not count.
    let template_grammar = "S S_i\nS_i store_i load_i\nCount:\nS\n";
    let graph = "0 1 store_i_7\n\
                 1 2 load_i_7\n\
                 3 4 store_i_9\n\
                 4 5 load_i_9\n\
                 1 6 load_i_9\n";

    let indices = BTreeSet::from([7, 9]);
    let expanded = template::expand(template_grammar, &indices);
    check_all_engines(&expanded, graph, &[(0, 2), (3, 5)]);
}

#[test]
fn mixed_nested_grammar() {
    // Balanced `open`/`close` brackets with nesting: L = { openⁿ closeⁿ }.
    // Graph: 0 -open> 1 -open> 2 -close> 3 -close> 4, plus a stray
    // close-edge 1 -close> 5 that closes the inner bracket differently.
    check_all_engines(
        "S open S1\nS1 S close\nS open close\nCount:\nS\n",
        "0 1 open\n1 2 open\n2 3 close\n3 4 close\n1 5 close\n",
        &[(1, 3), (0, 4), (0, 5)],
    );
}
