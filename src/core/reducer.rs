//! Pure rule group reducer
//!
//! Computes the desired state of a rule group after an action. The input group
//! is borrowed and never modified; a new group is returned.
//!
//! The reducer does not special-case emptiness: deleting the last rule yields a
//! group with no rules. Turning that into a group deletion is the planner's job.
//!
//! # Examples
//!
//! ```
//! use rulegroup_mutator::core::reducer::reduce;
//! use rulegroup_mutator::model::{Action, Rule, RuleGroup};
//!
//! let group = RuleGroup::new("g1", Some("1m".into()), vec![Rule::new("r1"), Rule::new("r2")]);
//! let paused = reduce(&group, &Action::Pause { uid: "r1".into(), pause: true }).unwrap();
//!
//! assert!(paused.rules[0].paused);
//! assert!(!group.rules[0].paused);
//! ```

use crate::error::{Result, RulerError};
use crate::model::{Action, Rule, RuleGroup};

/// Pure: Apply an action to a rule group, returning the new group
pub fn reduce(group: &RuleGroup, action: &Action) -> Result<RuleGroup> {
    match action {
        Action::Pause { uid, pause } => reduce_pause(group, uid, *pause),
        Action::Delete { rule } => reduce_delete(group, rule),
        Action::RenameGroup {
            new_group_name,
            new_interval,
        } => Ok(reduce_rename(group, new_group_name, new_interval.as_deref())),
        Action::MoveGroup {
            new_group_name,
            new_interval,
            ..
        } => {
            let name = new_group_name.as_deref().unwrap_or(&group.name);
            Ok(reduce_rename(group, name, new_interval.as_deref()))
        }
        Action::UpdateInterval { interval } => Ok(RuleGroup {
            interval: Some(interval.clone()),
            ..group.clone()
        }),
    }
}

/// Pure: Set the paused flag of one rule, leaving every other rule as is
fn reduce_pause(group: &RuleGroup, uid: &str, pause: bool) -> Result<RuleGroup> {
    if !group.contains_rule(uid) {
        return Err(RulerError::rule_not_found(format!(
            "no rule with uid '{}' in group '{}'",
            uid, group.name
        )));
    }

    let rules = group
        .rules
        .iter()
        .map(|rule| {
            if rule.uid == uid {
                Rule {
                    paused: pause,
                    ..rule.clone()
                }
            } else {
                rule.clone()
            }
        })
        .collect();

    Ok(RuleGroup {
        rules,
        ..group.clone()
    })
}

/// Pure: Remove one rule, keeping the relative order of the rest
fn reduce_delete(group: &RuleGroup, target: &Rule) -> Result<RuleGroup> {
    if !group.contains_rule(&target.uid) {
        return Err(RulerError::rule_not_found(format!(
            "no rule with uid '{}' in group '{}'",
            target.uid, group.name
        )));
    }

    let rules = group
        .rules
        .iter()
        .filter(|rule| rule.uid != target.uid)
        .cloned()
        .collect();

    Ok(RuleGroup {
        rules,
        ..group.clone()
    })
}

/// Pure: Same rules under a new name, optionally with a new interval.
/// Namespace routing is not decided here.
fn reduce_rename(group: &RuleGroup, new_name: &str, new_interval: Option<&str>) -> RuleGroup {
    RuleGroup {
        name: new_name.to_string(),
        interval: new_interval
            .map(str::to_string)
            .or_else(|| group.interval.clone()),
        rules: group.rules.clone(),
    }
}

/// Apply several actions in sequence, stopping on the first error
pub fn reduce_all(group: &RuleGroup, actions: &[Action]) -> Result<RuleGroup> {
    actions
        .iter()
        .try_fold(group.clone(), |current, action| reduce(&current, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_group() -> RuleGroup {
        RuleGroup::new(
            "g1",
            Some("1m".to_string()),
            vec![Rule::new("r1"), Rule::new("r2"), Rule::new("r3")],
        )
    }

    fn uids(group: &RuleGroup) -> Vec<&str> {
        group.rules.iter().map(|r| r.uid.as_str()).collect()
    }

    fn pause(uid: &str, pause: bool) -> Action {
        Action::Pause {
            uid: uid.to_string(),
            pause,
        }
    }

    // Pause tests

    #[test]
    fn test_pause_sets_flag_on_matching_rule_only() {
        let group = create_test_group();
        let updated = reduce(&group, &pause("r2", true)).unwrap();

        assert_eq!(uids(&updated), vec!["r1", "r2", "r3"]);
        assert!(!updated.rules[0].paused);
        assert!(updated.rules[1].paused);
        assert!(!updated.rules[2].paused);
        assert_eq!(updated.interval, group.interval);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let group = create_test_group();
        let once = reduce(&group, &pause("r1", true)).unwrap();
        let twice = reduce(&once, &pause("r1", true)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resume_clears_flag() {
        let group = reduce(&create_test_group(), &pause("r1", true)).unwrap();
        let resumed = reduce(&group, &pause("r1", false)).unwrap();
        assert!(!resumed.rules[0].paused);
    }

    #[test]
    fn test_pause_unknown_uid_fails_loudly() {
        let group = create_test_group();
        let result = reduce(&group, &pause("missing", true));
        assert!(matches!(result, Err(RulerError::RuleNotFound(_))));
    }

    #[test]
    fn test_pause_preserves_rule_count() {
        let group = create_test_group();
        let updated = reduce(&group, &pause("r3", true)).unwrap();
        assert_eq!(updated.rules.len(), group.rules.len());
    }

    // Delete tests

    #[test]
    fn test_delete_removes_exactly_one_rule_in_order() {
        let group = create_test_group();
        let updated = reduce(
            &group,
            &Action::Delete {
                rule: Rule::new("r2"),
            },
        )
        .unwrap();

        assert_eq!(updated.rules.len(), group.rules.len() - 1);
        assert_eq!(uids(&updated), vec!["r1", "r3"]);
    }

    #[test]
    fn test_delete_last_rule_yields_empty_group() {
        let group = RuleGroup::new("g1", None, vec![Rule::new("r1")]);
        let updated = reduce(
            &group,
            &Action::Delete {
                rule: Rule::new("r1"),
            },
        )
        .unwrap();

        assert!(updated.is_empty());
        assert_eq!(updated.name, "g1");
    }

    #[test]
    fn test_delete_matches_by_uid_only() {
        let group = create_test_group();
        let stale_copy = Rule::new("r1").with_field("title", serde_json::json!("old title"));
        let updated = reduce(&group, &Action::Delete { rule: stale_copy }).unwrap();
        assert_eq!(uids(&updated), vec!["r2", "r3"]);
    }

    #[test]
    fn test_delete_missing_rule_fails() {
        let group = create_test_group();
        let result = reduce(
            &group,
            &Action::Delete {
                rule: Rule::new("r9"),
            },
        );
        assert!(matches!(result, Err(RulerError::RuleNotFound(_))));
    }

    // Rename / move / interval tests

    #[test]
    fn test_rename_keeps_rules_and_interval() {
        let group = create_test_group();
        let updated = reduce(
            &group,
            &Action::RenameGroup {
                new_group_name: "g2".to_string(),
                new_interval: None,
            },
        )
        .unwrap();

        assert_eq!(updated.name, "g2");
        assert_eq!(updated.interval.as_deref(), Some("1m"));
        assert_eq!(updated.rules, group.rules);
    }

    #[test]
    fn test_rename_with_new_interval() {
        let group = create_test_group();
        let updated = reduce(
            &group,
            &Action::RenameGroup {
                new_group_name: "g2".to_string(),
                new_interval: Some("5m".to_string()),
            },
        )
        .unwrap();
        assert_eq!(updated.interval.as_deref(), Some("5m"));
    }

    #[test]
    fn test_move_without_new_name_keeps_group_name() {
        let group = create_test_group();
        let updated = reduce(
            &group,
            &Action::MoveGroup {
                new_namespace_name: "infra".to_string(),
                new_group_name: None,
                new_interval: None,
            },
        )
        .unwrap();

        assert_eq!(updated.name, "g1");
        assert_eq!(updated.rules, group.rules);
    }

    #[test]
    fn test_update_interval_touches_interval_only() {
        let group = create_test_group();
        let updated = reduce(
            &group,
            &Action::UpdateInterval {
                interval: "10m".to_string(),
            },
        )
        .unwrap();

        assert_eq!(updated.interval.as_deref(), Some("10m"));
        assert_eq!(updated.rules, group.rules);
        assert_eq!(updated.name, group.name);
    }

    #[test]
    fn test_reduce_is_deterministic_and_does_not_mutate_input() {
        let group = create_test_group();
        let snapshot = group.clone();
        let action = pause("r1", true);

        let first = reduce(&group, &action).unwrap();
        let second = reduce(&group, &action).unwrap();

        assert_eq!(first, second);
        assert_eq!(group, snapshot);
    }

    #[test]
    fn test_reduce_empty_group_is_legal_for_interval_updates() {
        let group = RuleGroup::new("empty", None, vec![]);
        let updated = reduce(
            &group,
            &Action::UpdateInterval {
                interval: "1m".to_string(),
            },
        )
        .unwrap();
        assert!(updated.is_empty());
    }

    #[test]
    fn test_reduce_all_stops_on_first_error() {
        let group = create_test_group();
        let result = reduce_all(&group, &[pause("r1", true), pause("nope", true)]);
        assert!(result.is_err());

        let ok = reduce_all(&group, &[pause("r1", true), pause("r2", true)]).unwrap();
        assert!(ok.rules[0].paused && ok.rules[1].paused);
    }
}
