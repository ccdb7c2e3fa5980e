//! Domain/layer classifier.
//!
//! Priority order: (1) explicit annotation, (2) config path-glob match,
//! (3) import-majority heuristic. No match leaves the fields unset; that
//! is not an error.

use std::collections::BTreeMap;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use sigil_core::config::SigilConfig;
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use super::DomainEntry;
use crate::index::{FileEntry, SymbolEntry};

/// Fill in `domains`/`layer` for files the annotations left unclassified.
pub fn classify_files(
    files: &mut BTreeMap<String, FileEntry>,
    config: &SigilConfig,
    sink: &DiagnosticSink,
) {
    // Tier 2: config path patterns.
    let globs = build_domain_globs(config, sink);
    for file in files.values_mut() {
        if !file.domains.is_empty() {
            continue;
        }
        for (domain, layer, set) in &globs {
            if set.is_match(&file.path) {
                file.domains.push(domain.clone());
                if file.layer.is_none() {
                    file.layer = layer.clone();
                }
            }
        }
    }

    // Tier 3: import majority. Based only on tier 1/2 classifications so
    // the outcome is independent of iteration order.
    let threshold = config.classifier.effective_majority_threshold();
    let classified: BTreeMap<String, Vec<String>> = files
        .iter()
        .filter(|(_, f)| !f.domains.is_empty())
        .map(|(path, f)| (path.clone(), f.domains.clone()))
        .collect();
    let known_paths: Vec<String> = files.keys().cloned().collect();

    let mut inferred: BTreeMap<String, String> = BTreeMap::new();
    for (path, file) in files.iter() {
        if !file.domains.is_empty() || file.imports.is_empty() {
            continue;
        }
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut resolved = 0usize;
        for spec in &file.imports {
            let Some(target) = resolve_import(spec, path, &known_paths) else {
                continue;
            };
            resolved += 1;
            if let Some(domains) = classified.get(&target) {
                for domain in domains {
                    *counts.entry(domain).or_insert(0) += 1;
                }
            }
        }
        if resolved == 0 {
            continue;
        }
        if let Some((domain, count)) = counts.iter().max_by_key(|(_, c)| **c) {
            if (*count as f64) / (resolved as f64) > threshold {
                debug!(path = %path, domain = %domain, "import-majority classified");
                inferred.insert(path.clone(), domain.to_string());
            }
        }
    }
    for (path, domain) in inferred {
        if let Some(file) = files.get_mut(&path) {
            file.domains.push(domain);
        }
    }
}

fn build_domain_globs(
    config: &SigilConfig,
    sink: &DiagnosticSink,
) -> Vec<(String, Option<String>, GlobSet)> {
    let mut out = Vec::new();
    for (domain, pattern_config) in &config.domains {
        let mut builder = GlobSetBuilder::new();
        let mut valid = 0;
        for pattern in &pattern_config.patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    valid += 1;
                }
                Err(e) => sink.emit(Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "invalid-domain-pattern",
                    format!("domain `{domain}` pattern `{pattern}`: {e}"),
                )),
            }
        }
        if valid == 0 {
            continue;
        }
        if let Ok(set) = builder.build() {
            out.push((domain.clone(), pattern_config.layer.clone(), set));
        }
    }
    out
}

/// Resolve an import specifier to a known project file, best effort.
/// Returns `None` for externals and ambiguous matches.
fn resolve_import(spec: &str, importer: &str, known: &[String]) -> Option<String> {
    let normalized = if spec.starts_with("./") || spec.starts_with("../") {
        let parent = importer.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        normalize_path(&format!("{parent}/{spec}"))
    } else {
        spec.replace("::", "/").replace('.', "/")
    };
    if normalized.is_empty() {
        return None;
    }

    let matches: Vec<&String> = known
        .iter()
        .filter(|path| {
            let stem = path
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(path.as_str());
            stem == normalized
                || stem.ends_with(&format!("/{normalized}"))
                || *path == &normalized
        })
        .collect();

    match matches.as_slice() {
        [single] => Some((*single).clone()),
        _ => None,
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Group classified files (and their symbols) into domain entries.
pub fn build_domain_entries(
    files: &BTreeMap<String, FileEntry>,
    symbols: &BTreeMap<String, SymbolEntry>,
    config: &SigilConfig,
) -> BTreeMap<String, DomainEntry> {
    let mut out: BTreeMap<String, DomainEntry> = BTreeMap::new();
    for (path, file) in files {
        for domain in &file.domains {
            let entry = out.entry(domain.clone()).or_insert_with(|| DomainEntry {
                name: domain.clone(),
                files: Vec::new(),
                symbols: Vec::new(),
                description: config
                    .domains
                    .get(domain)
                    .and_then(|d| d.description.clone()),
            });
            entry.files.push(path.clone());
        }
    }
    for (qualified, symbol) in symbols {
        if let Some(file) = files.get(&symbol.file) {
            for domain in &file.domains {
                if let Some(entry) = out.get_mut(domain) {
                    entry.symbols.push(qualified.clone());
                }
            }
        }
    }
    out
}
