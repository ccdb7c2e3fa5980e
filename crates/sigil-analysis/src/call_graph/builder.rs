//! Cross-file call resolution.
//!
//! Per-file extraction records callee *names*; this builder resolves them
//! against the global symbol index. Same-file symbols win, then globally
//! unambiguous name matches. Everything else is dropped (best effort).

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use super::types::CallGraph;
use crate::index::SymbolEntry;

/// Build the call graph from unresolved per-symbol callee names.
pub fn build_call_graph(
    calls: &[(String, Vec<String>)],
    symbols: &BTreeMap<String, SymbolEntry>,
) -> CallGraph {
    // Name index: simple name and dotted path both point at candidates.
    let mut by_name: FxHashMap<&str, SmallVec<[&str; 4]>> = FxHashMap::default();
    for (qualified, symbol) in symbols {
        by_name
            .entry(symbol.name.as_str())
            .or_default()
            .push(qualified.as_str());
        let dotted = dotted_path(qualified);
        if dotted != symbol.name {
            by_name.entry(dotted).or_default().push(qualified.as_str());
        }
    }

    let mut forward: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (caller, callees) in calls {
        if !symbols.contains_key(caller) {
            debug!(caller = %caller, "dropping call edges from unknown symbol");
            continue;
        }
        let caller_file = file_of(caller);
        let resolved: Vec<String> = callees
            .iter()
            .filter_map(|name| resolve(name, caller_file, symbols, &by_name))
            .filter(|callee| callee != caller)
            .collect();
        if !resolved.is_empty() {
            forward.entry(caller.clone()).or_default().extend(resolved);
        }
    }

    CallGraph::from_forward(forward)
}

fn file_of(qualified: &str) -> &str {
    qualified.rsplit_once(':').map(|(f, _)| f).unwrap_or(qualified)
}

fn dotted_path(qualified: &str) -> &str {
    qualified.rsplit_once(':').map(|(_, d)| d).unwrap_or(qualified)
}

fn resolve(
    name: &str,
    caller_file: &str,
    symbols: &BTreeMap<String, SymbolEntry>,
    by_name: &FxHashMap<&str, SmallVec<[&str; 4]>>,
) -> Option<String> {
    // Already qualified.
    if name.contains(':') {
        return symbols.contains_key(name).then(|| name.to_string());
    }

    let candidates = by_name.get(name)?;
    // Same-file match wins.
    if let Some(local) = candidates.iter().find(|q| file_of(q) == caller_file) {
        return Some((*local).to_string());
    }
    // Otherwise only a globally unambiguous match resolves.
    match candidates.as_slice() {
        [single] => Some((*single).to_string()),
        _ => {
            debug!(name = %name, "ambiguous callee, dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SymbolType;

    fn symbol(qualified: &str) -> SymbolEntry {
        let (file, dotted) = qualified.rsplit_once(':').unwrap();
        SymbolEntry {
            name: dotted.rsplit('.').next().unwrap().to_string(),
            qualified_name: qualified.to_string(),
            symbol_type: SymbolType::Function,
            file: file.to_string(),
            lines: [1, 5],
            exported: true,
            signature: None,
            summary: None,
            calls: Vec::new(),
            called_by: Vec::new(),
            extensions: Vec::new(),
        }
    }

    fn symbol_map(names: &[&str]) -> BTreeMap<String, SymbolEntry> {
        names
            .iter()
            .map(|q| (q.to_string(), symbol(q)))
            .collect()
    }

    #[test]
    fn test_same_file_resolution_wins() {
        let symbols = symbol_map(&["a.ts:f", "a.ts:helper", "b.ts:helper"]);
        let calls = vec![("a.ts:f".to_string(), vec!["helper".to_string()])];
        let graph = build_call_graph(&calls, &symbols);
        assert_eq!(graph.forward["a.ts:f"], vec!["a.ts:helper"]);
    }

    #[test]
    fn test_cross_file_unambiguous_resolution() {
        let symbols = symbol_map(&["a.ts:f", "b.ts:unique"]);
        let calls = vec![("a.ts:f".to_string(), vec!["unique".to_string()])];
        let graph = build_call_graph(&calls, &symbols);
        assert_eq!(graph.forward["a.ts:f"], vec!["b.ts:unique"]);
    }

    #[test]
    fn test_ambiguous_callee_dropped() {
        let symbols = symbol_map(&["a.ts:f", "b.ts:dup", "c.ts:dup"]);
        let calls = vec![("a.ts:f".to_string(), vec!["dup".to_string()])];
        let graph = build_call_graph(&calls, &symbols);
        assert!(graph.forward.is_empty());
    }

    #[test]
    fn test_dotted_and_qualified_names_resolve() {
        let symbols = symbol_map(&["a.py:Invoice.total", "b.py:report"]);
        let calls = vec![(
            "b.py:report".to_string(),
            vec!["Invoice.total".to_string(), "a.py:Invoice.total".to_string()],
        )];
        let graph = build_call_graph(&calls, &symbols);
        assert_eq!(graph.forward["b.py:report"], vec!["a.py:Invoice.total"]);
        assert!(graph.is_inverse_consistent());
    }
}
