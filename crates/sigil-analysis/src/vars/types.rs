//! Variable definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

/// What a variable points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Symbol,
    File,
    Domain,
}

/// A named, token-efficient reference to a symbol, file, or domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    #[serde(rename = "type")]
    pub var_type: VarType,
    /// Qualified symbol name, file path, or domain name. Must resolve
    /// against the cache at assembly time.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Containing file (symbol variables).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// `[start, end]` lines (symbol variables).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// The variable table: `name -> definition`, sorted for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableTable {
    #[serde(default)]
    pub vars: BTreeMap<String, VariableDefinition>,
}

impl VariableTable {
    pub fn get(&self, name: &str) -> Option<&VariableDefinition> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Insert unless the name is taken; collisions keep the first writer
    /// and emit a diagnostic.
    pub fn insert_unique(
        &mut self,
        name: String,
        definition: VariableDefinition,
        sink: &DiagnosticSink,
    ) {
        if let Some(existing) = self.vars.get(&name) {
            if *existing != definition {
                sink.emit(Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "variable-collision",
                    format!(
                        "variable {name} already defined for `{}`, ignoring `{}`",
                        existing.value, definition.value
                    ),
                ));
            }
            return;
        }
        self.vars.insert(name, definition);
    }
}

/// Mangle an identifier into variable-name form: uppercase, with every
/// non-alphanumeric run collapsed to `_`.
pub(crate) fn mangle(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_underscore = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_uppercase());
            last_underscore = false;
        } else if !last_underscore && !out.is_empty() {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle() {
        assert_eq!(mangle("Invoice.total"), "INVOICE_TOTAL");
        assert_eq!(mangle("src/billing/tax.ts"), "SRC_BILLING_TAX_TS");
        assert_eq!(mangle("audit-log"), "AUDIT_LOG");
    }

    #[test]
    fn test_collision_keeps_first() {
        let sink = DiagnosticSink::new();
        let mut table = VariableTable::default();
        let def = |value: &str| VariableDefinition {
            var_type: VarType::Domain,
            value: value.to_string(),
            description: None,
            source: None,
            lines: None,
            signature: None,
        };
        table.insert_unique("DOM_X".to_string(), def("first"), &sink);
        table.insert_unique("DOM_X".to_string(), def("second"), &sink);
        assert_eq!(table.get("DOM_X").unwrap().value, "first");
        assert_eq!(sink.snapshot()[0].code, "variable-collision");
    }
}
