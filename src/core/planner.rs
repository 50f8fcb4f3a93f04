//! Mutation planning
//!
//! Decides which store calls realize a reduced rule group. Planning is pure:
//! it looks at the action kind and at the reducer's output, never at the
//! network. Executing a plan lives in [`crate::core::executor`].
//!
//! | Action           | Reduced group      | Plan               |
//! |------------------|--------------------|--------------------|
//! | `Pause`          | any                | `ReplaceInPlace`   |
//! | `UpdateInterval` | any                | `ReplaceInPlace`   |
//! | `Delete`         | rules remain       | `ReplaceInPlace`   |
//! | `Delete`         | no rules left      | `DeleteGroup`      |
//! | `RenameGroup`    | any                | `CreateThenDelete` |
//! | `MoveGroup`      | any                | `CreateThenDelete` |
//!
//! A rename or move onto the group's own identifier is planned as
//! `ReplaceInPlace`, since create-then-delete would remove what it just wrote.

use crate::error::{Result, RulerError};
use crate::model::{Action, RuleGroup, RuleGroupIdentifier, RulerSource};
use serde::Serialize;
use std::fmt;

/// A store call a plan intends to make
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", content = "target", rename_all = "camelCase")]
pub enum StoreOperation {
    Fetch(RuleGroupIdentifier),
    Replace(RuleGroupIdentifier),
    Delete(RuleGroupIdentifier),
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOperation::Fetch(id) => write!(f, "fetch {}", id),
            StoreOperation::Replace(id) => write!(f, "replace {}", id),
            StoreOperation::Delete(id) => write!(f, "delete {}", id),
        }
    }
}

/// Sequence of store calls realizing one mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationPlan {
    /// Overwrite the group under its current identifier
    ReplaceInPlace {
        identifier: RuleGroupIdentifier,
        group: RuleGroup,
    },
    /// The group has no rules left; remove it instead of writing an empty list
    DeleteGroup { identifier: RuleGroupIdentifier },
    /// Conflict-check and write the group at `create`, then remove `delete`
    CreateThenDelete {
        create: RuleGroupIdentifier,
        group: RuleGroup,
        delete: RuleGroupIdentifier,
    },
}

impl MutationPlan {
    /// Store calls this plan makes, in execution order
    pub fn operations(&self) -> Vec<StoreOperation> {
        match self {
            MutationPlan::ReplaceInPlace { identifier, .. } => {
                vec![StoreOperation::Replace(identifier.clone())]
            }
            MutationPlan::DeleteGroup { identifier } => {
                vec![StoreOperation::Delete(identifier.clone())]
            }
            MutationPlan::CreateThenDelete { create, delete, .. } => vec![
                StoreOperation::Fetch(create.clone()),
                StoreOperation::Replace(create.clone()),
                StoreOperation::Delete(delete.clone()),
            ],
        }
    }

    /// Where the group lives once the plan has run, if it still exists
    pub fn destination(&self) -> Option<&RuleGroupIdentifier> {
        match self {
            MutationPlan::ReplaceInPlace { identifier, .. } => Some(identifier),
            MutationPlan::DeleteGroup { .. } => None,
            MutationPlan::CreateThenDelete { create, .. } => Some(create),
        }
    }
}

impl fmt::Display for MutationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationPlan::ReplaceInPlace { identifier, .. } => {
                write!(f, "replace-in-place {}", identifier)
            }
            MutationPlan::DeleteGroup { identifier } => write!(f, "delete-group {}", identifier),
            MutationPlan::CreateThenDelete { create, delete, .. } => {
                write!(f, "create {} then delete {}", create, delete)
            }
        }
    }
}

/// Pure: Check that an action is supported for the source before touching the store
pub fn validate_action(
    identifier: &RuleGroupIdentifier,
    action: &Action,
    source: &RulerSource,
) -> Result<()> {
    match action {
        Action::Pause { uid, .. } => {
            require_non_empty("rule uid", uid)?;
            if !source.is_grafana_managed() {
                return Err(RulerError::precondition(format!(
                    "pausing rules is only supported for Grafana-managed rules, '{}' is a data source ruler",
                    source.name
                )));
            }
            Ok(())
        }
        Action::Delete { rule } => require_non_empty("rule uid", &rule.uid),
        Action::RenameGroup {
            new_group_name,
            new_interval,
        } => {
            require_non_empty("new group name", new_group_name)?;
            require_optional_non_empty("new interval", new_interval.as_deref())
        }
        Action::MoveGroup {
            new_namespace_name,
            new_group_name,
            new_interval,
        } => {
            require_non_empty("new namespace name", new_namespace_name)?;
            require_optional_non_empty("new group name", new_group_name.as_deref())?;
            require_optional_non_empty("new interval", new_interval.as_deref())?;

            if source.is_grafana_managed() && *new_namespace_name != identifier.namespace_name {
                return Err(RulerError::precondition(
                    "moving a Grafana-managed rule group to another folder is not supported",
                ));
            }
            Ok(())
        }
        Action::UpdateInterval { interval } => require_non_empty("interval", interval),
    }
}

fn require_non_empty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RulerError::precondition(format!("{} must not be empty", what)));
    }
    Ok(())
}

fn require_optional_non_empty(what: &str, value: Option<&str>) -> Result<()> {
    value.map_or(Ok(()), |v| require_non_empty(what, v))
}

/// Pure: Select the plan that makes `reduced` true in the store
pub fn plan(
    identifier: &RuleGroupIdentifier,
    action: &Action,
    reduced: RuleGroup,
) -> MutationPlan {
    match action {
        Action::Pause { .. } | Action::UpdateInterval { .. } => MutationPlan::ReplaceInPlace {
            identifier: identifier.clone(),
            group: reduced,
        },
        Action::Delete { .. } => plan_delete(identifier, reduced),
        Action::RenameGroup { new_group_name, .. } => {
            relocate(identifier, identifier.with_group(new_group_name), reduced)
        }
        Action::MoveGroup {
            new_namespace_name,
            new_group_name,
            ..
        } => {
            let group_name = new_group_name
                .clone()
                .unwrap_or_else(|| identifier.group_name.clone());
            relocate(
                identifier,
                identifier.in_namespace(new_namespace_name, group_name),
                reduced,
            )
        }
    }
}

/// Pure: Delete plans depend on the reduced group, not on the action
fn plan_delete(identifier: &RuleGroupIdentifier, reduced: RuleGroup) -> MutationPlan {
    if reduced.is_empty() {
        MutationPlan::DeleteGroup {
            identifier: identifier.clone(),
        }
    } else {
        MutationPlan::ReplaceInPlace {
            identifier: identifier.clone(),
            group: reduced,
        }
    }
}

fn relocate(
    current: &RuleGroupIdentifier,
    target: RuleGroupIdentifier,
    reduced: RuleGroup,
) -> MutationPlan {
    if target == *current {
        return MutationPlan::ReplaceInPlace {
            identifier: target,
            group: reduced,
        };
    }

    MutationPlan::CreateThenDelete {
        create: target,
        group: reduced,
        delete: current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reducer::reduce;
    use crate::model::Rule;

    fn id() -> RuleGroupIdentifier {
        RuleGroupIdentifier::new("mimir", "ops", "g1")
    }

    fn group(rules: &[&str]) -> RuleGroup {
        RuleGroup::new(
            "g1",
            Some("1m".to_string()),
            rules.iter().map(|uid| Rule::new(*uid)).collect(),
        )
    }

    fn plan_for(group: &RuleGroup, action: Action) -> MutationPlan {
        let reduced = reduce(group, &action).unwrap();
        plan(&id(), &action, reduced)
    }

    #[test]
    fn test_pause_plans_replace_in_place() {
        let plan = plan_for(
            &group(&["r1"]),
            Action::Pause {
                uid: "r1".to_string(),
                pause: true,
            },
        );
        assert!(matches!(plan, MutationPlan::ReplaceInPlace { ref identifier, .. } if *identifier == id()));
    }

    #[test]
    fn test_update_interval_plans_replace_in_place() {
        let plan = plan_for(
            &group(&["r1"]),
            Action::UpdateInterval {
                interval: "5m".to_string(),
            },
        );
        assert_eq!(plan.operations(), vec![StoreOperation::Replace(id())]);
    }

    #[test]
    fn test_delete_last_rule_plans_group_deletion() {
        let plan = plan_for(
            &group(&["r1"]),
            Action::Delete {
                rule: Rule::new("r1"),
            },
        );
        assert_eq!(plan, MutationPlan::DeleteGroup { identifier: id() });
        assert_eq!(plan.destination(), None);
    }

    #[test]
    fn test_delete_with_remainder_plans_replace() {
        let plan = plan_for(
            &group(&["r1", "r2"]),
            Action::Delete {
                rule: Rule::new("r2"),
            },
        );
        match plan {
            MutationPlan::ReplaceInPlace { group, .. } => {
                assert_eq!(group.rules, vec![Rule::new("r1")]);
            }
            other => panic!("unexpected plan: {}", other),
        }
    }

    #[test]
    fn test_rename_plans_create_then_delete() {
        let plan = plan_for(
            &group(&["r1"]),
            Action::RenameGroup {
                new_group_name: "g2".to_string(),
                new_interval: None,
            },
        );

        assert_eq!(
            plan.operations(),
            vec![
                StoreOperation::Fetch(id().with_group("g2")),
                StoreOperation::Replace(id().with_group("g2")),
                StoreOperation::Delete(id()),
            ]
        );
    }

    #[test]
    fn test_move_targets_other_namespace() {
        let plan = plan_for(
            &group(&["r1"]),
            Action::MoveGroup {
                new_namespace_name: "infra".to_string(),
                new_group_name: Some("g9".to_string()),
                new_interval: None,
            },
        );

        match plan {
            MutationPlan::CreateThenDelete {
                create,
                group,
                delete,
            } => {
                assert_eq!(create, RuleGroupIdentifier::new("mimir", "infra", "g9"));
                assert_eq!(group.name, "g9");
                assert_eq!(delete, id());
            }
            other => panic!("unexpected plan: {}", other),
        }
    }

    #[test]
    fn test_rename_onto_itself_degenerates_to_replace() {
        let plan = plan_for(
            &group(&["r1"]),
            Action::RenameGroup {
                new_group_name: "g1".to_string(),
                new_interval: Some("5m".to_string()),
            },
        );
        assert_eq!(plan.operations(), vec![StoreOperation::Replace(id())]);
    }

    #[test]
    fn test_validate_rejects_grafana_folder_move() {
        let grafana_id = RuleGroupIdentifier::new("grafana", "folder-a", "g1");
        let action = Action::MoveGroup {
            new_namespace_name: "folder-b".to_string(),
            new_group_name: None,
            new_interval: None,
        };

        let err = validate_action(&grafana_id, &action, &RulerSource::grafana()).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_validate_allows_grafana_move_within_same_folder() {
        let grafana_id = RuleGroupIdentifier::new("grafana", "folder-a", "g1");
        let action = Action::MoveGroup {
            new_namespace_name: "folder-a".to_string(),
            new_group_name: Some("g2".to_string()),
            new_interval: None,
        };
        assert!(validate_action(&grafana_id, &action, &RulerSource::grafana()).is_ok());
    }

    #[test]
    fn test_validate_allows_data_source_namespace_move() {
        let action = Action::MoveGroup {
            new_namespace_name: "infra".to_string(),
            new_group_name: None,
            new_interval: None,
        };
        let source = RulerSource::data_source("mimir", "mimir-uid");
        assert!(validate_action(&id(), &action, &source).is_ok());
    }

    #[test]
    fn test_validate_rejects_pause_on_data_source() {
        let action = Action::Pause {
            uid: "r1".to_string(),
            pause: true,
        };
        let source = RulerSource::data_source("mimir", "mimir-uid");
        assert!(validate_action(&id(), &action, &source)
            .unwrap_err()
            .is_precondition());
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let source = RulerSource::data_source("mimir", "mimir-uid");
        let rename = Action::RenameGroup {
            new_group_name: "  ".to_string(),
            new_interval: None,
        };
        let interval = Action::UpdateInterval {
            interval: String::new(),
        };

        assert!(validate_action(&id(), &rename, &source).is_err());
        assert!(validate_action(&id(), &interval, &source).is_err());
    }

    #[test]
    fn test_plan_display() {
        let plan = MutationPlan::DeleteGroup { identifier: id() };
        assert_eq!(plan.to_string(), "delete-group mimir/ops/g1");
    }
}
