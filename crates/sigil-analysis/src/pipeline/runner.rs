//! The run orchestrator.
//!
//! Parallel phase: per-file extraction over a rayon pool, results sent
//! through a channel into a path-indexed collector (workers finish out of
//! order; every aggregation merge is order-independent). Aggregation
//! phase: a single barrier that performs no I/O. Cancellation is
//! cooperative at file-task boundaries and the cache is produced
//! all-or-nothing.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use sigil_core::config::{SigilConfig, Strictness};
use sigil_core::diagnostics::{Diagnostic, DiagnosticSink, Severity};
use sigil_core::errors::PipelineError;
use sigil_core::traits::{Cancellable, CancellationToken};

use super::extract::{extract_file, SourceFile};
use crate::cache::{assemble, Cache, ProjectInfo};
use crate::index::FileExtraction;
use crate::vars::{build_variable_table, validate_table, VariableTable};

/// Everything a run produces.
#[derive(Debug)]
pub struct RunOutput {
    pub cache: Cache,
    pub variables: VariableTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// One indexing run: parallel extraction, then aggregation.
pub struct Pipeline {
    config: SigilConfig,
}

impl Pipeline {
    pub fn new(config: SigilConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SigilConfig {
        &self.config
    }

    /// Run the pipeline over a pre-resolved file list.
    ///
    /// Permissive mode always yields a complete (possibly partial) cache
    /// plus diagnostics; strict mode yields either a fully valid cache or
    /// the first fatal diagnostic.
    pub fn run(
        &self,
        project: ProjectInfo,
        mut sources: Vec<SourceFile>,
        git_commit: Option<String>,
        token: &CancellationToken,
    ) -> Result<RunOutput, PipelineError> {
        let sink = DiagnosticSink::new();

        let max_files = self.config.limits.effective_max_files();
        if sources.len() > max_files {
            sink.emit(Diagnostic::new(
                sigil_core::diagnostics::Category::Resource,
                match self.config.strictness {
                    Strictness::Permissive => Severity::Warning,
                    Strictness::Strict => Severity::Error,
                },
                "too-many-files",
                format!(
                    "{} input files, indexing the first {max_files}",
                    sources.len()
                ),
            ));
            sources.truncate(max_files);
        }

        info!(files = sources.len(), "extraction phase starting");

        // Parallel phase. Workers push into an MPSC channel; the collector
        // is the only shared mutable resource and insertion order does not
        // matter.
        let (tx, rx) = crossbeam_channel::unbounded::<(String, FileExtraction)>();
        sources.par_iter().for_each_with(tx, |tx, source| {
            if token.is_cancelled() {
                return;
            }
            if let Some(extraction) = extract_file(source, &self.config, &sink) {
                let _ = tx.send((source.path.clone(), extraction));
            }
        });

        let mut collected: FxHashMap<String, FileExtraction> = FxHashMap::default();
        for (path, extraction) in rx {
            collected.insert(path, extraction);
        }

        // In-flight results are discarded wholesale; no partial aggregate
        // is ever exposed.
        if token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        self.check_strict(&sink)?;

        debug!(extracted = collected.len(), "aggregation phase starting");

        let source_files: BTreeMap<String, u64> = sources
            .iter()
            .filter(|s| collected.contains_key(&s.path))
            .map(|s| (s.path.clone(), s.modified_at_ms.unwrap_or(0)))
            .collect();

        // Deterministic aggregation input regardless of worker order.
        let mut extractions: Vec<(String, FileExtraction)> = collected.into_iter().collect();
        extractions.sort_by(|(a, _), (b, _)| a.cmp(b));
        let extractions: Vec<FileExtraction> =
            extractions.into_iter().map(|(_, e)| e).collect();

        let cache = assemble(
            extractions,
            project,
            git_commit,
            source_files,
            &self.config,
            &sink,
        );
        let mut variables = build_variable_table(&cache, &sink);
        for name in validate_table(&variables, &cache, &sink) {
            variables.vars.remove(&name);
        }

        self.check_strict(&sink)?;

        info!(
            files = cache.stats.files,
            symbols = cache.stats.symbols,
            variables = variables.len(),
            "run complete"
        );

        Ok(RunOutput {
            cache,
            variables,
            diagnostics: sink.into_vec(),
        })
    }

    /// Strict mode aborts on the first diagnostic above warning.
    fn check_strict(&self, sink: &DiagnosticSink) -> Result<(), PipelineError> {
        if self.config.strictness == Strictness::Strict {
            if let Some(fatal) = sink.first_at_least(Severity::Error) {
                return Err(PipelineError::Strict(fatal));
            }
        }
        Ok(())
    }
}
