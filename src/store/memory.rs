//! In-memory rule group store for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Result, RulerError};
use crate::model::{RuleGroup, RulerSource};
use crate::store::{OperationResult, RuleGroupStore};

type GroupKey = (String, String, String);

/// In-memory store keyed by (source uid, namespace, group name).
///
/// Like most remote rulers it refuses to store a group without rules.
#[derive(Clone, Default)]
pub struct MemoryRuleStore {
    groups: Arc<RwLock<HashMap<GroupKey, RuleGroup>>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group directly, bypassing validation
    pub async fn seed(&self, source_uid: &str, namespace: &str, group: RuleGroup) {
        self.groups.write().await.insert(
            (
                source_uid.to_string(),
                namespace.to_string(),
                group.name.clone(),
            ),
            group,
        );
    }

    /// Look up a group without going through the store trait
    pub async fn get(&self, source_uid: &str, namespace: &str, group: &str) -> Option<RuleGroup> {
        self.groups
            .read()
            .await
            .get(&key(source_uid, namespace, group))
            .cloned()
    }

    /// Number of stored groups across all sources
    pub async fn len(&self) -> usize {
        self.groups.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.groups.read().await.is_empty()
    }
}

fn key(source_uid: &str, namespace: &str, group: &str) -> GroupKey {
    (
        source_uid.to_string(),
        namespace.to_string(),
        group.to_string(),
    )
}

#[async_trait]
impl RuleGroupStore for MemoryRuleStore {
    async fn fetch_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<RuleGroup> {
        self.get(&source.uid, namespace, group)
            .await
            .ok_or_else(|| RulerError::not_found(format!("{}/{}/{}", source.name, namespace, group)))
    }

    async fn replace_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        payload: &RuleGroup,
    ) -> Result<OperationResult> {
        if payload.is_empty() {
            return Err(RulerError::validation(format!(
                "rule group '{}' must contain at least one rule",
                payload.name
            )));
        }

        self.groups
            .write()
            .await
            .insert(key(&source.uid, namespace, &payload.name), payload.clone());
        Ok(OperationResult::with_message("rule group updated"))
    }

    async fn delete_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<OperationResult> {
        match self
            .groups
            .write()
            .await
            .remove(&key(&source.uid, namespace, group))
        {
            Some(_) => Ok(OperationResult::with_message("rule group deleted")),
            None => Err(RulerError::not_found(format!(
                "{}/{}/{}",
                source.name, namespace, group
            ))),
        }
    }
}
