//! Expansion of grammar templates over indices observed in graph labels.
//!
//! A symbol ending in `_i` (and not in `_i_<digits>`) is a *template*; a
//! symbol matching `_i_<digits>` at the end is a *concrete instance* of
//! that template. Given a grammar containing template symbols and a graph
//! whose labels carry concrete indices, every rule that mentions a template
//! symbol is duplicated once per observed index, with `_i` replaced by
//! `_i_<index>` uniformly within that rule. Rules without template symbols
//! are copied verbatim, and the `Count:` footer is preserved.

use crate::error::ReadError;
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// True iff `symbol` is a template (`…_i`, not a concrete instance).
pub fn is_template_symbol(symbol: &str) -> bool {
    // A concrete instance ends in digits, so `ends_with("_i")` already
    // excludes it; the tightened rule is stated for clarity.
    symbol.ends_with("_i") && concrete_index(symbol).is_none()
}

/// The index of a concrete instance `…_i_<digits>`, if `symbol` is one.
pub fn concrete_index(symbol: &str) -> Option<u32> {
    let position = symbol.rfind("_i_")?;
    let digits = &symbol[position + 3..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Replace a trailing `_i` by `_i_<index>`; non-template symbols pass
/// through unchanged.
fn instantiate(symbol: &str, index: u32) -> String {
    if is_template_symbol(symbol) {
        format!("{}_i_{}", &symbol[..symbol.len() - 2], index)
    } else {
        symbol.to_string()
    }
}

/// True iff any rule line of the grammar text mentions a template symbol.
pub fn needs_expansion(grammar_text: &str) -> bool {
    rule_lines(grammar_text).any(|line| line.split_whitespace().any(is_template_symbol))
}

/// Collect the set of concrete indices occurring in the labels of a graph
/// file (third column).
pub fn collect_indices(graph_path: impl AsRef<Path>) -> Result<BTreeSet<u32>, ReadError> {
    let path = graph_path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ReadError::FileMissing {
        path: path.to_path_buf(),
        source,
    })?;

    let mut indices = BTreeSet::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(label) = line.split_whitespace().nth(2) {
            if let Some(index) = concrete_index(label) {
                indices.insert(index);
            }
        }
    }
    debug!("Found {} unique indices in `{}`.", indices.len(), path.display());
    Ok(indices)
}

/// Expand every template rule of `grammar_text` once per index in
/// `indices`, preserving rule order and the `Count:` footer.
pub fn expand(grammar_text: &str, indices: &BTreeSet<u32>) -> String {
    let mut output = String::new();
    let mut lines = grammar_text.lines();

    for line in lines.by_ref() {
        let trimmed = line.trim();
        if trimmed == "Count:" {
            output.push_str("Count:\n");
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.iter().any(|t| is_template_symbol(t)) {
            for &index in indices {
                let expanded: Vec<String> =
                    tokens.iter().map(|t| instantiate(t, index)).collect();
                output.push_str(&expanded.join(" "));
                output.push('\n');
            }
        } else {
            output.push_str(&tokens.join(" "));
            output.push('\n');
        }
    }

    // The start symbol after the footer is copied verbatim.
    for line in lines {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            output.push_str(trimmed);
            output.push('\n');
            break;
        }
    }

    output
}

/// Expand the grammar at `grammar_path` against the labels of `graph_path`
/// when it contains template symbols.
///
/// Returns the original path unchanged when no template symbol exists (or
/// when the graph carries no concrete indices to instantiate); otherwise
/// writes `<grammar_path>.expanded` and returns that path. Callers that
/// treat the expanded file as temporary are expected to remove it.
pub fn expand_if_needed(
    grammar_path: impl AsRef<Path>,
    graph_path: impl AsRef<Path>,
) -> Result<PathBuf, ReadError> {
    let grammar_path = grammar_path.as_ref();
    let text = std::fs::read_to_string(grammar_path).map_err(|source| ReadError::FileMissing {
        path: grammar_path.to_path_buf(),
        source,
    })?;

    if !needs_expansion(&text) {
        return Ok(grammar_path.to_path_buf());
    }

    let indices = collect_indices(&graph_path)?;
    if indices.is_empty() {
        info!("Grammar has template symbols but the graph has no concrete indices.");
        return Ok(grammar_path.to_path_buf());
    }

    let expanded = expand(&text, &indices);
    let mut output_path = grammar_path.as_os_str().to_owned();
    output_path.push(".expanded");
    let output_path = PathBuf::from(output_path);
    std::fs::write(&output_path, expanded).map_err(|source| ReadError::FileMissing {
        path: output_path.clone(),
        source,
    })?;
    info!(
        "Expanded template grammar over {} indices into `{}`.",
        indices.len(),
        output_path.display()
    );
    Ok(output_path)
}

fn rule_lines(grammar_text: &str) -> impl Iterator<Item = &str> {
    grammar_text
        .lines()
        .map(str::trim)
        .take_while(|line| *line != "Count:")
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_detection_follows_suffix_rule() {
        assert!(is_template_symbol("store_i"));
        assert!(is_template_symbol("load_i"));
        assert!(!is_template_symbol("store_i_7"));
        assert!(!is_template_symbol("store"));
        // A bare trailing `i` is not a template marker.
        assert!(!is_template_symbol("pi"));
        assert!(!is_template_symbol("i"));
        assert!(is_template_symbol("_i"));
    }

    #[test]
    fn concrete_index_extraction() {
        assert_eq!(concrete_index("store_i_698"), Some(698));
        assert_eq!(concrete_index("load_i_0"), Some(0));
        assert_eq!(concrete_index("store_i"), None);
        assert_eq!(concrete_index("store_i_"), None);
        assert_eq!(concrete_index("store_i_7x"), None);
        assert_eq!(concrete_index("store"), None);
    }

    #[test]
    fn instantiate_replaces_trailing_marker() {
        assert_eq!(instantiate("store_i", 7), "store_i_7");
        assert_eq!(instantiate("plain", 7), "plain");
    }

    #[test]
    fn expansion_duplicates_template_rules_uniformly() {
        let grammar = "\
S S_i
S_i store_i load_i
T x y
Count:
S
";
        let indices = BTreeSet::from([7, 9]);
        let expanded = expand(grammar, &indices);
        let expected = "\
S S_i_7
S S_i_9
S_i_7 store_i_7 load_i_7
S_i_9 store_i_9 load_i_9
T x y
Count:
S
";
        assert_eq!(expanded, expected);
    }

    #[test]
    fn needs_expansion_ignores_footer_and_comments() {
        assert!(needs_expansion("S store_i x\nCount:\nS\n"));
        assert!(!needs_expansion("# store_i\nS a b\nCount:\nS\n"));
        assert!(!needs_expansion("S a b\nCount:\nS\n"));
    }
}
