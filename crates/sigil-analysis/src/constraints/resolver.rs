//! The constraint cascade resolver.
//!
//! Merges four precedence levels (`symbol > file > directory > project`)
//! into one effective `ConstraintSet`, per kind:
//!
//! - `lock_level`: most restrictive wins; at equal restriction the more
//!   specific level supplies the reason and directive
//! - `style`: most specific guide replaces; rules union in level order
//! - `behavior`: most specific level wins outright
//! - `quality`: set union across all levels
//!
//! Pure function of its inputs: no I/O, deterministic, referentially
//! transparent.

use super::types::{ConstraintLayer, ConstraintSet, LockLevel, StyleConstraint};

/// Resolve the effective constraints from the four cascade levels.
pub fn resolve(
    project: &ConstraintLayer,
    directory: &ConstraintLayer,
    file: &ConstraintLayer,
    symbol: &ConstraintLayer,
) -> ConstraintSet {
    // Least specific first; later layers win ties.
    let layers = [project, directory, file, symbol];

    let mut lock: Option<LockLevel> = None;
    let mut lock_reason = None;
    let mut directive = None;
    let mut style_guide = None;
    let mut style_rules: Vec<String> = Vec::new();
    let mut behavior = None;
    let mut quality: Vec<String> = Vec::new();

    for layer in layers {
        if let Some(level) = layer.lock {
            // Most restrictive among the levels that say anything; the
            // default only applies when no level does.
            if lock.map_or(true, |current| level >= current) {
                lock = Some(level);
                lock_reason = layer.lock_reason.clone();
                directive = layer.lock_directive.clone();
            }
        }
        if layer.style_guide.is_some() {
            style_guide = layer.style_guide.clone();
        }
        for rule in &layer.style_rules {
            if !style_rules.contains(rule) {
                style_rules.push(rule.clone());
            }
        }
        if layer.behavior.is_some() {
            behavior = layer.behavior;
        }
        for gate in &layer.quality {
            if !quality.contains(gate) {
                quality.push(gate.clone());
            }
        }
    }

    let style = (style_guide.is_some() || !style_rules.is_empty()).then(|| StyleConstraint {
        guide: style_guide,
        rules: style_rules,
    });

    ConstraintSet {
        lock_level: lock.unwrap_or_default(),
        lock_reason,
        directive,
        style,
        behavior: behavior.unwrap_or_default(),
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::types::BehaviorProfile;

    fn lock_layer(level: LockLevel) -> ConstraintLayer {
        ConstraintLayer {
            lock: Some(level),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_when_nothing_specified() {
        let empty = ConstraintLayer::default();
        let set = resolve(&empty, &empty, &empty, &empty);
        assert_eq!(set.lock_level, LockLevel::Normal);
        assert!(set.style.is_none());
        assert_eq!(set.behavior, BehaviorProfile::Balanced);
        assert!(set.quality.is_empty());
    }

    #[test]
    fn test_most_restrictive_lock_wins_regardless_of_level() {
        // Project says frozen, file says normal: frozen sticks.
        let set = resolve(
            &lock_layer(LockLevel::Frozen),
            &ConstraintLayer::default(),
            &lock_layer(LockLevel::Normal),
            &ConstraintLayer::default(),
        );
        assert_eq!(set.lock_level, LockLevel::Frozen);
    }

    #[test]
    fn test_directory_then_file_escalation() {
        // project normal, directory approval-required, file restricted.
        let set = resolve(
            &lock_layer(LockLevel::Normal),
            &lock_layer(LockLevel::ApprovalRequired),
            &lock_layer(LockLevel::Restricted),
            &ConstraintLayer::default(),
        );
        assert_eq!(set.lock_level, LockLevel::Restricted);
    }

    #[test]
    fn test_equal_locks_take_most_specific_reason() {
        let mut dir = lock_layer(LockLevel::Restricted);
        dir.lock_reason = Some("directory says".to_string());
        let mut file = lock_layer(LockLevel::Restricted);
        file.lock_reason = Some("file says".to_string());
        let set = resolve(&ConstraintLayer::default(), &dir, &file, &ConstraintLayer::default());
        assert_eq!(set.lock_reason.as_deref(), Some("file says"));
    }

    #[test]
    fn test_style_guide_replaced_rules_accumulate() {
        let project = ConstraintLayer {
            style_guide: Some("house-style".to_string()),
            style_rules: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        let file = ConstraintLayer {
            style_guide: Some("frontend-style".to_string()),
            style_rules: vec!["b".to_string(), "c".to_string()],
            ..Default::default()
        };
        let empty = ConstraintLayer::default();
        let set = resolve(&project, &empty, &file, &empty);
        let style = set.style.unwrap();
        assert_eq!(style.guide.as_deref(), Some("frontend-style"));
        assert_eq!(style.rules, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_behavior_most_specific_wins_no_merge() {
        let project = ConstraintLayer {
            behavior: Some(BehaviorProfile::Conservative),
            ..Default::default()
        };
        let symbol = ConstraintLayer {
            behavior: Some(BehaviorProfile::Aggressive),
            ..Default::default()
        };
        let empty = ConstraintLayer::default();
        let set = resolve(&project, &empty, &empty, &symbol);
        assert_eq!(set.behavior, BehaviorProfile::Aggressive);
    }

    #[test]
    fn test_experimental_only_layer_is_effective() {
        // The normal default applies only when no level says anything.
        let set = resolve(
            &lock_layer(LockLevel::Experimental),
            &ConstraintLayer::default(),
            &ConstraintLayer::default(),
            &ConstraintLayer::default(),
        );
        assert_eq!(set.lock_level, LockLevel::Experimental);
    }

    #[test]
    fn test_quality_unions() {
        let project = ConstraintLayer {
            quality: vec!["tests".to_string()],
            ..Default::default()
        };
        let symbol = ConstraintLayer {
            quality: vec!["security-review".to_string(), "tests".to_string()],
            ..Default::default()
        };
        let empty = ConstraintLayer::default();
        let set = resolve(&project, &empty, &empty, &symbol);
        assert_eq!(set.quality, vec!["tests", "security-review"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let project = ConstraintLayer {
            lock: Some(LockLevel::TestsRequired),
            style_rules: vec!["r1".to_string()],
            quality: vec!["tests".to_string()],
            ..Default::default()
        };
        let symbol = ConstraintLayer {
            lock: Some(LockLevel::Frozen),
            behavior: Some(BehaviorProfile::Conservative),
            ..Default::default()
        };
        let empty = ConstraintLayer::default();
        let first = resolve(&project, &empty, &empty, &symbol);
        let second = resolve(&project, &empty, &empty, &symbol);
        assert_eq!(first, second);
    }
}
