//! Variable table builder.
//!
//! Derives `SYM_`/`FILE_`/`DOM_` variables from the assembled cache:
//! exported symbols, files carrying a module or summary, and every
//! domain.

use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use super::types::{mangle, VarType, VariableDefinition, VariableTable};
use crate::cache::Cache;

/// Build the variable table from an assembled cache.
pub fn build_variable_table(cache: &Cache, sink: &DiagnosticSink) -> VariableTable {
    let mut table = VariableTable::default();

    for (qualified, symbol) in &cache.symbols {
        if !symbol.exported {
            continue;
        }
        let name = format!("SYM_{}", mangle(&dotted(qualified)));
        table.insert_unique(
            name,
            VariableDefinition {
                var_type: VarType::Symbol,
                value: qualified.clone(),
                description: symbol.summary.clone(),
                source: Some(symbol.file.clone()),
                lines: Some(symbol.lines),
                signature: symbol.signature.clone(),
            },
            sink,
        );
    }

    for (path, file) in &cache.files {
        if file.module.is_none() && file.summary.is_none() {
            continue;
        }
        let name = format!("FILE_{}", mangle(path));
        table.insert_unique(
            name,
            VariableDefinition {
                var_type: VarType::File,
                value: path.clone(),
                description: file.summary.clone().or_else(|| file.module.clone()),
                source: None,
                lines: Some([1, file.lines]),
                signature: None,
            },
            sink,
        );
    }

    for (name, domain) in &cache.domains {
        let var_name = format!("DOM_{}", mangle(name));
        let description = domain
            .description
            .clone()
            .unwrap_or_else(|| format!("Domain: {} ({} files)", name, domain.files.len()));
        table.insert_unique(
            var_name,
            VariableDefinition {
                var_type: VarType::Domain,
                value: name.clone(),
                description: Some(description),
                source: None,
                lines: None,
                signature: None,
            },
            sink,
        );
    }

    table
}

/// Flag definitions whose value no longer resolves against the cache.
/// Returns the invalid names; useful for externally-loaded tables.
pub fn validate_table(table: &VariableTable, cache: &Cache, sink: &DiagnosticSink) -> Vec<String> {
    let mut invalid = Vec::new();
    for (name, def) in &table.vars {
        let resolves = match def.var_type {
            VarType::Symbol => cache.symbols.contains_key(&def.value),
            VarType::File => cache.files.contains_key(&def.value),
            VarType::Domain => cache.domains.contains_key(&def.value),
        };
        if !resolves {
            sink.emit(Diagnostic::new(
                Category::Reference,
                Severity::Warning,
                "invalid-variable",
                format!("variable {name} points at unknown `{}`", def.value),
            ));
            invalid.push(name.clone());
        }
    }
    invalid
}

fn dotted(qualified: &str) -> String {
    qualified
        .rsplit_once(':')
        .map(|(_, d)| d.to_string())
        .unwrap_or_else(|| qualified.to_string())
}
