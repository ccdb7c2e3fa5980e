//! Cache assembly.
//!
//! Runs after the parallel phase with the complete per-file result set:
//! domain classification, cross-file call resolution, constraint cascade
//! resolution, integrity checks, and stats. Performs no I/O. All merges
//! are commutative and associative, so worker completion order never
//! affects the result.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use sigil_core::config::{SigilConfig, Strictness};
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use super::types::{Cache, ConstraintIndex, ProjectInfo, Stats};
use crate::call_graph::build_call_graph;
use crate::constraints::{resolve, ConstraintLayer, LockLevel};
use crate::domains::{build_domain_entries, classify_files};
use crate::index::FileExtraction;

/// Assemble the cache from the complete extraction set.
pub fn assemble(
    extractions: Vec<FileExtraction>,
    project: ProjectInfo,
    git_commit: Option<String>,
    source_files: BTreeMap<String, u64>,
    config: &SigilConfig,
    sink: &DiagnosticSink,
) -> Cache {
    let mut files = BTreeMap::new();
    let mut symbols = BTreeMap::new();
    let mut file_layers: BTreeMap<String, ConstraintLayer> = BTreeMap::new();
    let mut symbol_layers: BTreeMap<String, ConstraintLayer> = BTreeMap::new();
    let mut calls: Vec<(String, Vec<String>)> = Vec::new();
    let mut annotations = 0usize;

    for extraction in extractions {
        let Some(file) = extraction.file else { continue };
        annotations += extraction.annotation_count;
        if files.contains_key(&file.path) {
            sink.emit(integrity_diagnostic(
                config.strictness,
                "duplicate-file",
                format!("file `{}` extracted twice, keeping the first", file.path),
            ));
            continue;
        }
        if !extraction.file_layer.is_empty() {
            file_layers.insert(file.path.clone(), extraction.file_layer);
        }
        for (qualified, layer) in extraction.symbol_layers {
            symbol_layers.insert(qualified, layer);
        }
        calls.extend(extraction.calls);
        for symbol in extraction.symbols {
            if symbols.contains_key(&symbol.qualified_name) {
                sink.emit(integrity_diagnostic(
                    config.strictness,
                    "duplicate-symbol",
                    format!(
                        "qualified name `{}` defined twice, keeping the first",
                        symbol.qualified_name
                    ),
                ));
                continue;
            }
            symbols.insert(symbol.qualified_name.clone(), symbol);
        }
        files.insert(file.path.clone(), file);
    }

    // Domain classification needs every file present.
    classify_files(&mut files, config, sink);

    // Cross-file call resolution, then the integrity pass.
    let mut graph = build_call_graph(&calls, &symbols);
    let dangling: Vec<String> = graph
        .nodes()
        .filter(|q| !symbols.contains_key(*q))
        .cloned()
        .collect();
    if !dangling.is_empty() {
        for node in &dangling {
            sink.emit(
                integrity_diagnostic(
                    config.strictness,
                    "dangling-graph-node",
                    format!("call graph references unknown symbol `{node}`"),
                )
                .with_suggestion("re-run indexing; the cache and sources disagree"),
            );
            graph.forward.remove(node);
            for callees in graph.forward.values_mut() {
                callees.retain(|c| c != node);
            }
        }
        graph = crate::call_graph::CallGraph::from_forward(graph.forward);
    }
    debug_assert!(graph.is_inverse_consistent());

    // Mirror adjacency onto the symbol records.
    for (caller, callees) in &graph.forward {
        if let Some(symbol) = symbols.get_mut(caller) {
            symbol.calls = callees.clone();
        }
    }
    for (callee, callers) in &graph.reverse {
        if let Some(symbol) = symbols.get_mut(callee) {
            symbol.called_by = callers.clone();
        }
    }

    let mut domains = build_domain_entries(&files, &symbols, config);
    for entry in domains.values_mut() {
        entry.files.retain(|path| {
            let known = files.contains_key(path);
            if !known {
                sink.emit(integrity_diagnostic(
                    config.strictness,
                    "dangling-domain-file",
                    format!("domain `{}` lists unknown file `{path}`", entry.name),
                ));
            }
            known
        });
    }

    // Constraint cascade, file level then symbol level.
    let project_layer = ConstraintLayer::from_defaults(&config.constraints, "project", sink);
    let empty = ConstraintLayer::default();
    let mut constraints = ConstraintIndex::default();

    for path in files.keys() {
        let directory_layer = config
            .directory_constraints_for(path)
            .map(|d| ConstraintLayer::from_defaults(d, "directory", sink))
            .unwrap_or_default();
        let file_layer = file_layers.get(path).unwrap_or(&empty);
        let effective = resolve(&project_layer, &directory_layer, file_layer, &empty);

        if effective.lock_level != LockLevel::Normal {
            constraints
                .by_lock_level
                .entry(effective.lock_level.as_str().to_string())
                .or_default()
                .push(path.clone());
        }

        for (qualified, symbol_layer) in symbol_layers.range(format!("{path}:")..) {
            if !qualified.starts_with(&format!("{path}:")) {
                break;
            }
            let symbol_effective =
                resolve(&project_layer, &directory_layer, file_layer, symbol_layer);
            if symbol_effective != effective {
                constraints
                    .by_symbol
                    .insert(qualified.clone(), symbol_effective);
            }
        }

        constraints.by_file.insert(path.clone(), effective);
    }

    // Symbol layers whose file never made it into the index.
    for qualified in symbol_layers.keys() {
        let file = qualified.rsplit_once(':').map(|(f, _)| f).unwrap_or("");
        if !files.contains_key(file) {
            warn!(qualified = %qualified, "symbol constraints for unindexed file dropped");
        }
    }

    let annotated = symbols.values().filter(|s| s.summary.is_some()).count();
    let stats = Stats {
        files: files.len(),
        symbols: symbols.len(),
        lines: files.values().map(|f| f.lines).sum(),
        annotations,
        annotation_coverage: if symbols.is_empty() {
            0.0
        } else {
            (annotated as f64 / symbols.len() as f64) * 100.0
        },
    };
    debug!(
        files = stats.files,
        symbols = stats.symbols,
        annotations = stats.annotations,
        "cache assembled"
    );

    Cache {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at_ms: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
        git_commit,
        project,
        stats,
        source_files,
        files,
        symbols,
        graph,
        domains,
        constraints,
    }
}

/// Integrity violations: drop-with-warning in permissive mode, abort (via
/// error severity) in strict mode.
fn integrity_diagnostic(strictness: Strictness, code: &'static str, message: String) -> Diagnostic {
    let severity = match strictness {
        Strictness::Permissive => Severity::Warning,
        Strictness::Strict => Severity::Error,
    };
    Diagnostic::new(Category::Reference, severity, code, message)
}
