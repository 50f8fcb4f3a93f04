//! Plan execution
//!
//! Interprets a [`MutationPlan`] against a [`RuleGroupStore`]. Steps are
//! awaited strictly in sequence; ordering between steps is part of the
//! protocol's safety guarantees.
//!
//! `CreateThenDelete` runs create-before-delete:
//!
//! 1. fetch the target, treating `NotFound` as an empty target
//! 2. abort with `Conflict` if the target already holds rules
//! 3. write the group under the target identifier
//! 4. delete the old group
//!
//! If step 3 fails the old group is intact. If step 4 fails the rules are
//! visible under both names until the caller retries the delete; they are
//! never lost.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::planner::{MutationPlan, StoreOperation};
use crate::error::{Result, RulerError};
use crate::model::{RuleGroup, RuleGroupIdentifier, RulerSource};
use crate::store::{fetch_group_or_empty, RuleGroupStore};

/// Result of a successfully executed plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    /// Where the group lives now; `None` when the group was deleted
    pub identifier: Option<RuleGroupIdentifier>,
    /// The group as persisted; `None` when the group was deleted
    pub group: Option<RuleGroup>,
    /// Store calls performed, in order
    pub operations: Vec<StoreOperation>,
}

/// Execute a plan against the store
pub async fn execute<S: RuleGroupStore + ?Sized>(
    store: &S,
    source: &RulerSource,
    plan: MutationPlan,
) -> Result<MutationOutcome> {
    debug!("Executing plan: {}", plan);

    match plan {
        MutationPlan::ReplaceInPlace { identifier, group } => {
            store
                .replace_group(source, &identifier.namespace_name, &group)
                .await?;

            Ok(MutationOutcome {
                operations: vec![StoreOperation::Replace(identifier.clone())],
                identifier: Some(identifier),
                group: Some(group),
            })
        }
        MutationPlan::DeleteGroup { identifier } => {
            delete_tolerating_absence(store, source, &identifier).await?;

            Ok(MutationOutcome {
                identifier: None,
                group: None,
                operations: vec![StoreOperation::Delete(identifier)],
            })
        }
        MutationPlan::CreateThenDelete {
            create,
            group,
            delete,
        } => {
            let target = fetch_group_or_empty(store, source, &create).await?;
            if let Some(existing) = target.filter(|g| !g.is_empty()) {
                return Err(RulerError::conflict(format!(
                    "target rule group {} already contains {} rule(s); merging rule groups is not supported",
                    create,
                    existing.rules.len()
                )));
            }

            store
                .replace_group(source, &create.namespace_name, &group)
                .await?;
            info!("Created rule group {}", create);

            delete_tolerating_absence(store, source, &delete).await?;
            info!("Removed rule group {} after relocation", delete);

            Ok(MutationOutcome {
                operations: vec![
                    StoreOperation::Fetch(create.clone()),
                    StoreOperation::Replace(create.clone()),
                    StoreOperation::Delete(delete),
                ],
                identifier: Some(create),
                group: Some(group),
            })
        }
    }
}

/// Delete a group; an already absent group already matches the intended end state
async fn delete_tolerating_absence<S: RuleGroupStore + ?Sized>(
    store: &S,
    source: &RulerSource,
    identifier: &RuleGroupIdentifier,
) -> Result<()> {
    match store
        .delete_group(source, &identifier.namespace_name, &identifier.group_name)
        .await
    {
        Ok(_) => Ok(()),
        Err(err) if err.is_not_found() => {
            warn!("Rule group {} was already gone, nothing to delete", identifier);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
