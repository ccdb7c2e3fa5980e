//! Advisory staleness detection.
//!
//! Compares a cache against caller-supplied current source state. The
//! stored `git_commit` is authoritative when both sides have one;
//! otherwise every `source_files` mtime is compared, including files that
//! appeared or vanished since the cache was built.

use super::types::{Cache, SourceState, StalenessReason, StalenessReport};

/// Check whether `cache` still matches `current`. Advisory only.
pub fn check_staleness(cache: &Cache, current: &SourceState) -> StalenessReport {
    let mut reasons = Vec::new();

    if let (Some(cached), Some(head)) = (cache.git_commit.as_deref(), current.git_commit.as_deref())
    {
        if cached != head {
            reasons.push(StalenessReason::CommitChanged {
                cached: cached.to_string(),
                current: head.to_string(),
            });
        }
        // Commit comparison is authoritative either way.
        return StalenessReport {
            stale: !reasons.is_empty(),
            reasons,
        };
    }

    for (path, cached_mtime) in &cache.source_files {
        match current.mtimes_ms.get(path) {
            Some(mtime) if mtime != cached_mtime => {
                reasons.push(StalenessReason::FileModified { path: path.clone() })
            }
            Some(_) => {}
            None => reasons.push(StalenessReason::FileRemoved { path: path.clone() }),
        }
    }
    for path in current.mtimes_ms.keys() {
        if !cache.source_files.contains_key(path) {
            reasons.push(StalenessReason::FileAdded { path: path.clone() });
        }
    }

    StalenessReport {
        stale: !reasons.is_empty(),
        reasons,
    }
}
