//! The variable expansion engine.
//!
//! Scans text for `$NAME`, `$NAME.modifier`, and the `$$` escape, and
//! resolves references against the cache and variable table. Recursive
//! expansion is depth-counted with a hard bound: at the limit the token
//! becomes `[CIRCULAR: <path>]` and a warning, never an infinite loop.

use once_cell::sync::Lazy;
use regex::Regex;

use sigil_core::config::{SigilConfig, Strictness};
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};
use sigil_core::errors::ExpandError;

use super::types::{VarType, VariableDefinition, VariableTable};
use crate::cache::Cache;

/// `$NAME` or `$NAME.modifier`, anchored at the scan position.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9_]*)(?:\.([a-z]+))?").unwrap());

/// Expansion result: output text plus the diagnostics the run produced.
#[derive(Debug, Clone)]
pub struct ExpansionOutput {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Expands variable references against a loaded cache and table.
pub struct Expander<'a> {
    cache: &'a Cache,
    table: &'a VariableTable,
    strictness: Strictness,
    max_depth: usize,
}

impl<'a> Expander<'a> {
    pub fn new(cache: &'a Cache, table: &'a VariableTable, strictness: Strictness) -> Self {
        Self {
            cache,
            table,
            strictness,
            max_depth: 10,
        }
    }

    /// Build from run configuration: strictness and expansion depth.
    pub fn from_config(cache: &'a Cache, table: &'a VariableTable, config: &SigilConfig) -> Self {
        Self::new(cache, table, config.strictness)
            .with_max_depth(config.limits.effective_max_expansion_depth())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Expand every reference in `text`.
    ///
    /// Permissive mode leaves unresolved tokens literal (plus a warning);
    /// strict mode aborts on the first unresolved name.
    pub fn expand(&self, text: &str) -> Result<ExpansionOutput, ExpandError> {
        let sink = DiagnosticSink::new();
        let output = self.expand_inner(text, 0, &mut Vec::new(), &sink)?;
        Ok(ExpansionOutput {
            output,
            diagnostics: sink.into_vec(),
        })
    }

    fn expand_inner(
        &self,
        text: &str,
        depth: usize,
        chain: &mut Vec<String>,
        sink: &DiagnosticSink,
    ) -> Result<String, ExpandError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            // `$$` escapes to a literal `$`, no lookup, zero diagnostics.
            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
                continue;
            }

            match TOKEN.captures(after) {
                Some(caps) => {
                    let full = caps.get(0).unwrap();
                    let name = caps.get(1).unwrap().as_str();
                    let modifier = caps.get(2).map(|m| m.as_str());
                    let replacement =
                        self.resolve_token(name, modifier, full.as_str(), depth, chain, sink)?;
                    out.push_str(&replacement);
                    rest = &after[full.end()..];
                }
                None => {
                    // A lone `$` is ordinary text.
                    out.push('$');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn resolve_token(
        &self,
        name: &str,
        modifier: Option<&str>,
        token: &str,
        depth: usize,
        chain: &mut Vec<String>,
        sink: &DiagnosticSink,
    ) -> Result<String, ExpandError> {
        let Some(def) = self.table.get(name) else {
            match self.strictness {
                Strictness::Strict => {
                    return Err(ExpandError::Unresolved {
                        name: name.to_string(),
                    })
                }
                Strictness::Permissive => {
                    sink.emit(Diagnostic::new(
                        Category::Reference,
                        Severity::Warning,
                        "unresolved-variable",
                        format!("${name} is not defined"),
                    ));
                    return Ok(format!("${token}"));
                }
            }
        };

        if depth >= self.max_depth {
            let mut parts = chain.clone();
            parts.push(name.to_string());
            let path = parts.join(" -> ");
            sink.emit(Diagnostic::new(
                Category::Reference,
                Severity::Warning,
                "circular-expansion",
                format!("expansion depth limit hit: {path}"),
            ));
            return Ok(format!("[CIRCULAR: {path}]"));
        }

        let rendered = self.render(name, def, modifier, sink);

        // Replacement text may itself reference variables.
        chain.push(name.to_string());
        let expanded = self.expand_inner(&rendered, depth + 1, chain, sink);
        chain.pop();
        expanded
    }

    /// Render one definition according to its modifier.
    fn render(
        &self,
        name: &str,
        def: &VariableDefinition,
        modifier: Option<&str>,
        sink: &DiagnosticSink,
    ) -> String {
        match modifier {
            None => self.summary_of(name, def),
            Some("full") => self.full_record(name, def),
            Some("ref") => match (def.var_type, def.lines) {
                (VarType::Symbol, Some([start, end])) => {
                    let file = def.source.as_deref().unwrap_or("");
                    format!("{file}:{start}-{end}")
                }
                (VarType::File, _) => def.value.clone(),
                _ => {
                    sink.emit(Diagnostic::new(
                        Category::Semantic,
                        Severity::Warning,
                        "modifier-inapplicable",
                        format!("${name}.ref has no location, using summary"),
                    ));
                    self.summary_of(name, def)
                }
            },
            Some("signature") => match def.signature.as_deref() {
                Some(signature) => signature.to_string(),
                None => {
                    sink.emit(Diagnostic::new(
                        Category::Semantic,
                        Severity::Warning,
                        "modifier-inapplicable",
                        format!("${name}.signature is unavailable, using summary"),
                    ));
                    self.summary_of(name, def)
                }
            },
            Some(other) => {
                sink.emit(Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "invalid-modifier",
                    format!("unknown modifier `.{other}` on ${name}"),
                ));
                self.summary_of(name, def)
            }
        }
    }

    /// One-line summary: the description, else a location-ish fallback.
    fn summary_of(&self, _name: &str, def: &VariableDefinition) -> String {
        if let Some(description) = def.description.as_deref() {
            return description.to_string();
        }
        match (def.var_type, def.lines) {
            (VarType::Symbol, Some([start, end])) => format!(
                "{} ({}:{start}-{end})",
                def.value,
                def.source.as_deref().unwrap_or("")
            ),
            _ => def.value.clone(),
        }
    }

    /// Complete record: the underlying cache entry as pretty JSON.
    fn full_record(&self, name: &str, def: &VariableDefinition) -> String {
        let json = match def.var_type {
            VarType::Symbol => self
                .cache
                .get_symbol(&def.value)
                .and_then(|s| serde_json::to_string_pretty(s).ok()),
            VarType::File => self
                .cache
                .get_file(&def.value)
                .and_then(|f| serde_json::to_string_pretty(f).ok()),
            VarType::Domain => self
                .cache
                .domains
                .get(&def.value)
                .and_then(|d| serde_json::to_string_pretty(d).ok()),
        };
        json.unwrap_or_else(|| {
            // Dangling definitions degrade to the summary.
            self.summary_of(name, def)
        })
    }
}
