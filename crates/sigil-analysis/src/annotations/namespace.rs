//! The reserved namespace table.
//!
//! Immutable and compiled in; extensions are matched by pattern, never
//! registered at runtime.

/// Static description of one reserved namespace.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceSpec {
    pub name: &'static str,
    /// Sub-namespaces this namespace accepts.
    pub subs: &'static [&'static str],
    /// Whether repeated occurrences accumulate (array-typed) instead of
    /// overwriting (scalar, last wins).
    pub array: bool,
}

/// All reserved (non-extension) namespaces.
pub static RESERVED: &[NamespaceSpec] = &[
    NamespaceSpec { name: "module", subs: &[], array: false },
    NamespaceSpec { name: "summary", subs: &[], array: false },
    NamespaceSpec { name: "purpose", subs: &[], array: false },
    NamespaceSpec { name: "owner", subs: &[], array: false },
    NamespaceSpec { name: "domain", subs: &[], array: true },
    NamespaceSpec { name: "layer", subs: &[], array: false },
    NamespaceSpec { name: "lock", subs: &[], array: false },
    NamespaceSpec { name: "style", subs: &["guide", "rules"], array: false },
    NamespaceSpec { name: "behavior", subs: &[], array: false },
    NamespaceSpec { name: "quality", subs: &[], array: true },
    NamespaceSpec { name: "calls", subs: &[], array: true },
    NamespaceSpec { name: "imports", subs: &[], array: true },
    NamespaceSpec { name: "exports", subs: &[], array: true },
    NamespaceSpec { name: "deprecated", subs: &[], array: false },
    NamespaceSpec { name: "todo", subs: &[], array: true },
    NamespaceSpec { name: "fixme", subs: &[], array: true },
    NamespaceSpec { name: "critical", subs: &[], array: true },
    NamespaceSpec { name: "perf", subs: &[], array: true },
    NamespaceSpec { name: "hack", subs: &[], array: true },
    NamespaceSpec { name: "fn", subs: &[], array: false },
    NamespaceSpec { name: "class", subs: &[], array: false },
    NamespaceSpec { name: "method", subs: &[], array: false },
    NamespaceSpec { name: "const", subs: &[], array: false },
];

/// Look up a reserved namespace.
pub fn reserved_spec(name: &str) -> Option<&'static NamespaceSpec> {
    RESERVED.iter().find(|spec| spec.name == name)
}

/// True for `x-{vendor}` extension namespaces. The feature part arrives as
/// the sub-namespace.
pub fn is_extension(namespace: &str) -> bool {
    match namespace.strip_prefix("x-") {
        Some(vendor) => {
            !vendor.is_empty()
                && vendor
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_lookup() {
        assert!(reserved_spec("lock").is_some());
        assert!(reserved_spec("style").unwrap().subs.contains(&"rules"));
        assert!(reserved_spec("domain").unwrap().array);
        assert!(!reserved_spec("lock").unwrap().array);
        assert!(reserved_spec("frobnicate").is_none());
    }

    #[test]
    fn test_extension_pattern() {
        assert!(is_extension("x-acme"));
        assert!(is_extension("x-my-vendor2"));
        assert!(!is_extension("x-"));
        assert!(!is_extension("acme"));
        assert!(!is_extension("xacme"));
    }
}
