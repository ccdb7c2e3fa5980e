//! Call graph adjacency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bidirectional call graph keyed by qualified symbol name.
///
/// `reverse` is never edited independently: it is always recomputed as the
/// exact inverse of `forward`, so the two stay mutual inverses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraph {
    /// caller -> callees, adjacency sorted.
    #[serde(default)]
    pub forward: BTreeMap<String, Vec<String>>,
    /// callee -> callers, adjacency sorted.
    #[serde(default)]
    pub reverse: BTreeMap<String, Vec<String>>,
}

impl CallGraph {
    /// Build from a forward adjacency; the reverse map is derived.
    pub fn from_forward(mut forward: BTreeMap<String, Vec<String>>) -> Self {
        for callees in forward.values_mut() {
            callees.sort();
            callees.dedup();
        }
        let reverse = invert(&forward);
        Self { forward, reverse }
    }

    pub fn callees(&self, qualified: &str) -> Option<&Vec<String>> {
        self.forward.get(qualified)
    }

    pub fn callers(&self, qualified: &str) -> Option<&Vec<String>> {
        self.reverse.get(qualified)
    }

    /// Every node mentioned on either side of an edge.
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.forward
            .keys()
            .chain(self.forward.values().flatten())
    }

    /// Holds by construction; exposed for tests and assembly checks:
    /// `callee in forward[caller] <=> caller in reverse[callee]`.
    pub fn is_inverse_consistent(&self) -> bool {
        let recomputed = invert(&self.forward);
        recomputed == self.reverse
    }
}

fn invert(forward: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    let mut reverse: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (caller, callees) in forward {
        for callee in callees {
            reverse.entry(callee.clone()).or_default().push(caller.clone());
        }
    }
    for callers in reverse.values_mut() {
        callers.sort();
        callers.dedup();
    }
    reverse
}
