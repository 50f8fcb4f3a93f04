//! Rule group store abstraction
//!
//! The remote ruler only offers whole-group operations: fetch one group,
//! replace one group, delete one group. Implementations:
//!
//! - [`memory::MemoryRuleStore`] - in-process store for tests and dry runs
//! - [`http::HttpRulerStore`] - Grafana ruler HTTP API

pub mod http;
pub mod memory;
pub mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::{RuleGroup, RuleGroupIdentifier, RulerSource};

pub use http::HttpRulerStore;
pub use memory::MemoryRuleStore;
pub use wire::WireRuleGroup;

/// Acknowledgement returned by write operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationResult {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Whole-group operations offered by a remote ruler
#[async_trait]
pub trait RuleGroupStore: Send + Sync {
    /// Fetch one group. Fails with `NotFound` when it does not exist.
    async fn fetch_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<RuleGroup>;

    /// Write the full group into the namespace, overwriting whatever existed
    async fn replace_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        payload: &RuleGroup,
    ) -> Result<OperationResult>;

    /// Delete one group. Fails with `NotFound` if already absent.
    async fn delete_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<OperationResult>;
}

/// Fetch a group, mapping `NotFound` to `None`.
///
/// Used where an absent group is a legitimate answer, e.g. checking whether a
/// rename target is free. Every other error still propagates.
pub async fn fetch_group_or_empty<S: RuleGroupStore + ?Sized>(
    store: &S,
    source: &RulerSource,
    identifier: &RuleGroupIdentifier,
) -> Result<Option<RuleGroup>> {
    match store
        .fetch_group(source, &identifier.namespace_name, &identifier.group_name)
        .await
    {
        Ok(group) => Ok(Some(group)),
        Err(err) if err.is_not_found() => {
            debug!("Rule group {} does not exist", identifier);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RulerError;
    use crate::model::Rule;

    #[tokio::test]
    async fn test_fetch_or_empty_maps_not_found_to_none() {
        let store = MemoryRuleStore::new();
        let source = RulerSource::grafana();
        let id = RuleGroupIdentifier::new("grafana", "ops", "missing");

        let result = fetch_group_or_empty(&store, &source, &id).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_or_empty_returns_existing_group() {
        let store = MemoryRuleStore::new();
        let source = RulerSource::grafana();
        let group = RuleGroup::new("g1", None, vec![Rule::new("r1")]);
        store.seed("grafana", "ops", group.clone()).await;

        let id = RuleGroupIdentifier::new("grafana", "ops", "g1");
        let result = fetch_group_or_empty(&store, &source, &id).await.unwrap();
        assert_eq!(result, Some(group));
    }

    #[tokio::test]
    async fn test_fetch_or_empty_propagates_other_errors() {
        let store = crate::testing::RecordingStore::new(MemoryRuleStore::new());
        store
            .fail_next_fetch(RulerError::remote(Some(500), "boom"))
            .await;

        let id = RuleGroupIdentifier::new("grafana", "ops", "g1");
        let err = fetch_group_or_empty(&store, &RulerSource::grafana(), &id)
            .await
            .unwrap_err();
        assert!(matches!(err, RulerError::Remote { status: Some(500), .. }));
    }
}
