//! End-to-end pipeline tests: lock cascades, graph properties,
//! strictness behavior, cancellation, and staleness.

use std::collections::BTreeMap;

use sigil_analysis::cache::{check_staleness, ProjectInfo, SourceState};
use sigil_analysis::constraints::LockLevel;
use sigil_analysis::pipeline::{Pipeline, RunOutput, SourceFile};
use sigil_core::config::{ConstraintDefaults, SigilConfig, Strictness};
use sigil_core::diagnostics::Severity;
use sigil_core::errors::PipelineError;
use sigil_core::traits::{Cancellable, CancellationToken};

fn run(config: SigilConfig, sources: Vec<SourceFile>) -> RunOutput {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Pipeline::new(config)
        .run(
            ProjectInfo::default(),
            sources,
            None,
            &CancellationToken::new(),
        )
        .expect("permissive run should succeed")
}

#[test]
fn test_frozen_symbol_and_normal_sibling() {
    // @acp:lock frozen on a function locks that symbol; an unannotated
    // sibling in the same file stays at the default.
    let content = "\
export function sibling() {}

// @acp:lock frozen - must not modify
export function payout() {}
";
    let out = run(
        SigilConfig::default(),
        vec![SourceFile::new("src/pay.ts", "typescript", content)],
    );

    let payout = out.cache.symbol_constraints("src/pay.ts:payout");
    assert_eq!(payout.lock_level, LockLevel::Frozen);
    assert_eq!(payout.directive.as_deref(), Some("must not modify"));

    let sibling = out.cache.symbol_constraints("src/pay.ts:sibling");
    assert_eq!(sibling.lock_level, LockLevel::Normal);
}

#[test]
fn test_cascade_project_directory_file() {
    // project normal, directory approval-required, file restricted:
    // the most restrictive level wins.
    let mut config = SigilConfig::default();
    config.constraints = ConstraintDefaults {
        lock: Some("normal".to_string()),
        ..Default::default()
    };
    config.directory_constraints.insert(
        "src/payments".to_string(),
        ConstraintDefaults {
            lock: Some("approval-required".to_string()),
            ..Default::default()
        },
    );

    let content = "\
// @acp:lock restricted - payments team approval needed
export function charge() {}
";
    let out = run(
        config,
        vec![
            SourceFile::new("src/payments/charge.ts", "typescript", content),
            SourceFile::new("src/payments/refund.ts", "typescript", "export function refund() {}\n"),
            SourceFile::new("src/util.ts", "typescript", "export function fmt() {}\n"),
        ],
    );

    assert_eq!(
        out.cache.file_constraints("src/payments/charge.ts").lock_level,
        LockLevel::Restricted
    );
    // Unannotated file in the directory inherits the directory override.
    assert_eq!(
        out.cache.file_constraints("src/payments/refund.ts").lock_level,
        LockLevel::ApprovalRequired
    );
    assert_eq!(
        out.cache.file_constraints("src/util.ts").lock_level,
        LockLevel::Normal
    );
    // The lock-level index groups the non-normal files.
    assert!(out.cache.constraints.by_lock_level["restricted"]
        .contains(&"src/payments/charge.ts".to_string()));
}

#[test]
fn test_two_blocks_accumulate_domains() {
    let content = "\
// @acp:domain billing - invoicing

// @acp:domain compliance - audit requirements

export function f() {}
";
    let out = run(
        SigilConfig::default(),
        vec![SourceFile::new("src/a.ts", "typescript", content)],
    );
    let file = out.cache.get_file("src/a.ts").unwrap();
    assert_eq!(file.domains, vec!["billing", "compliance"]);
    assert!(out.cache.domains.contains_key("billing"));
    assert!(out.cache.domains.contains_key("compliance"));
}

#[test]
fn test_call_graph_forward_reverse_inverse() {
    let a = "\
export function charge() {
  validate();
}
export function validate() {}
";
    let b = "\
// @acp:calls charge - kicks off billing
export function nightly() {}
";
    let out = run(
        SigilConfig::default(),
        vec![
            SourceFile::new("src/a.ts", "typescript", a),
            SourceFile::new("src/b.ts", "typescript", b),
        ],
    );

    let graph = &out.cache.graph;
    assert!(graph.is_inverse_consistent());
    assert_eq!(
        graph.callees("src/a.ts:charge").unwrap(),
        &vec!["src/a.ts:validate".to_string()]
    );
    assert_eq!(
        graph.callers("src/a.ts:charge").unwrap(),
        &vec!["src/b.ts:nightly".to_string()]
    );

    // The symbol records mirror the adjacency.
    let charge = out.cache.get_symbol("src/a.ts:charge").unwrap();
    assert_eq!(charge.calls, vec!["src/a.ts:validate"]);
    assert_eq!(charge.called_by, vec!["src/b.ts:nightly"]);

    // Every edge is mutual: callee in forward[caller] iff caller in
    // reverse[callee].
    for (caller, callees) in &graph.forward {
        for callee in callees {
            assert!(graph.callers(callee).unwrap().contains(caller));
        }
    }
}

#[test]
fn test_malformed_file_does_not_corrupt_others() {
    let bad = "// @acp:summary \"never closed - oops\nexport function broken() {}\n";
    let good = "// @acp:lock frozen - hands off\nexport function fine() {}\n";
    let out = run(
        SigilConfig::default(),
        vec![
            SourceFile::new("src/bad.ts", "typescript", bad),
            SourceFile::new("src/good.ts", "typescript", good),
        ],
    );

    // Both files are present; the malformed annotation produced a
    // diagnostic, not a corrupted cache.
    assert_eq!(out.cache.stats.files, 2);
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.code == "malformed-annotation"));
    assert_eq!(
        out.cache.symbol_constraints("src/good.ts:fine").lock_level,
        LockLevel::Frozen
    );
}

#[test]
fn test_strict_mode_aborts_on_missing_directive() {
    let mut config = SigilConfig::default();
    config.strictness = Strictness::Strict;

    let content = "// @acp:lock frozen\nexport function f() {}\n";
    let result = Pipeline::new(config).run(
        ProjectInfo::default(),
        vec![SourceFile::new("src/a.ts", "typescript", content)],
        None,
        &CancellationToken::new(),
    );

    match result {
        Err(PipelineError::Strict(diagnostic)) => {
            assert_eq!(diagnostic.code, "missing-directive");
            assert_eq!(diagnostic.severity, Severity::Error);
        }
        other => panic!("expected strict abort, got {other:?}"),
    }
}

#[test]
fn test_permissive_synthesizes_missing_directive() {
    let content = "// @acp:lock frozen\nexport function f() {}\n";
    let out = run(
        SigilConfig::default(),
        vec![SourceFile::new("src/a.ts", "typescript", content)],
    );
    // The run completes and the lock still applies, with a default
    // directive standing in.
    let set = out.cache.symbol_constraints("src/a.ts:f");
    assert_eq!(set.lock_level, LockLevel::Frozen);
    assert!(set.directive.is_some());
    assert!(out.diagnostics.iter().any(|d| d.code == "missing-directive"));
}

#[test]
fn test_cancellation_yields_no_cache() {
    let token = CancellationToken::new();
    token.cancel();
    let result = Pipeline::new(SigilConfig::default()).run(
        ProjectInfo::default(),
        vec![SourceFile::new("src/a.ts", "typescript", "export function f() {}\n")],
        None,
        &token,
    );
    assert!(matches!(result, Err(PipelineError::Cancelled)));
}

#[test]
fn test_source_files_and_staleness() {
    let mut source = SourceFile::new("src/a.ts", "typescript", "export function f() {}\n");
    source.modified_at_ms = Some(1_000);
    let out = run(SigilConfig::default(), vec![source]);
    assert_eq!(out.cache.source_files["src/a.ts"], 1_000);

    let fresh = SourceState {
        git_commit: None,
        mtimes_ms: BTreeMap::from([("src/a.ts".to_string(), 1_000)]),
    };
    assert!(!check_staleness(&out.cache, &fresh).stale);

    let touched = SourceState {
        git_commit: None,
        mtimes_ms: BTreeMap::from([("src/a.ts".to_string(), 2_000)]),
    };
    assert!(check_staleness(&out.cache, &touched).stale);
}

#[test]
fn test_variable_table_derivation() {
    let content = "\
// @acp:module \"Billing\" - money flows
// @acp:domain billing - payments

// @acp:summary \"charges a card\" - wraps the PSP
export function charge() {}
";
    let out = run(
        SigilConfig::default(),
        vec![SourceFile::new("src/billing.ts", "typescript", content)],
    );

    let sym = out.variables.get("SYM_CHARGE").unwrap();
    assert_eq!(sym.value, "src/billing.ts:charge");
    assert_eq!(sym.description.as_deref(), Some("charges a card"));

    let file = out.variables.get("FILE_SRC_BILLING_TS").unwrap();
    assert_eq!(file.value, "src/billing.ts");

    let dom = out.variables.get("DOM_BILLING").unwrap();
    assert_eq!(dom.value, "billing");
}

#[test]
fn test_runs_are_deterministic() {
    let sources = || {
        vec![
            SourceFile::new(
                "src/a.ts",
                "typescript",
                "// @acp:domain billing - x\nexport function f() { g(); }\nexport function g() {}\n",
            ),
            SourceFile::new("src/b.py", "python", "# @acp:layer service - y\ndef h():\n    pass\n"),
        ]
    };
    let first = run(SigilConfig::default(), sources());
    let second = run(SigilConfig::default(), sources());

    assert_eq!(first.cache.files, second.cache.files);
    assert_eq!(first.cache.symbols, second.cache.symbols);
    assert_eq!(first.cache.graph, second.cache.graph);
    assert_eq!(first.cache.domains, second.cache.domains);
    assert_eq!(first.cache.constraints, second.cache.constraints);
    assert_eq!(first.variables, second.variables);
}

#[test]
fn test_cache_serializes_round_trip() {
    let out = run(
        SigilConfig::default(),
        vec![SourceFile::new(
            "src/a.ts",
            "typescript",
            "// @acp:lock restricted - careful\nexport function f() {}\n",
        )],
    );
    let json = serde_json::to_string_pretty(&out.cache).unwrap();
    let parsed: sigil_analysis::cache::Cache = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.files, out.cache.files);
    assert_eq!(parsed.constraints, out.cache.constraints);
    assert_eq!(parsed.graph, out.cache.graph);
}
