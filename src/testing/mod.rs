//! Testing utilities
//!
//! [`RecordingStore`] wraps any [`RuleGroupStore`], records every call in
//! order and can inject failures per operation. Tests use the call log to
//! assert both which store calls happened and in what order.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Result, RulerError};
use crate::model::{RuleGroup, RulerSource};
use crate::store::{OperationResult, RuleGroupStore};

/// A store call as observed by [`RecordingStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Fetch { namespace: String, group: String },
    Replace { namespace: String, group: RuleGroup },
    Delete { namespace: String, group: String },
}

impl RecordedCall {
    /// Group name the call addressed
    pub fn group_name(&self) -> &str {
        match self {
            RecordedCall::Fetch { group, .. } | RecordedCall::Delete { group, .. } => group,
            RecordedCall::Replace { group, .. } => &group.name,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, RecordedCall::Replace { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, RecordedCall::Delete { .. })
    }
}

#[derive(Default)]
struct InjectedFailures {
    fetch: VecDeque<RulerError>,
    replace: VecDeque<RulerError>,
    delete: VecDeque<RulerError>,
}

/// Store wrapper that records calls and injects failures
pub struct RecordingStore<S> {
    inner: S,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failures: Arc<Mutex<InjectedFailures>>,
}

impl<S: RuleGroupStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(InjectedFailures::default())),
        }
    }

    /// The wrapped store, for inspecting state without recording a call
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// All calls made so far, in order
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Only the write calls (replace and delete), in order
    pub async fn writes(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| !matches!(c, RecordedCall::Fetch { .. }))
            .cloned()
            .collect()
    }

    pub async fn replace_count(&self) -> usize {
        self.calls.lock().await.iter().filter(|c| c.is_replace()).count()
    }

    pub async fn delete_count(&self) -> usize {
        self.calls.lock().await.iter().filter(|c| c.is_delete()).count()
    }

    pub async fn reset(&self) {
        self.calls.lock().await.clear();
        *self.failures.lock().await = InjectedFailures::default();
    }

    /// Fail the next fetch with the given error
    pub async fn fail_next_fetch(&self, error: RulerError) {
        self.failures.lock().await.fetch.push_back(error);
    }

    /// Fail the next replace with the given error
    pub async fn fail_next_replace(&self, error: RulerError) {
        self.failures.lock().await.replace.push_back(error);
    }

    /// Fail the next delete with the given error
    pub async fn fail_next_delete(&self, error: RulerError) {
        self.failures.lock().await.delete.push_back(error);
    }
}

#[async_trait]
impl<S: RuleGroupStore> RuleGroupStore for RecordingStore<S> {
    async fn fetch_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<RuleGroup> {
        self.calls.lock().await.push(RecordedCall::Fetch {
            namespace: namespace.to_string(),
            group: group.to_string(),
        });

        if let Some(err) = self.failures.lock().await.fetch.pop_front() {
            return Err(err);
        }
        self.inner.fetch_group(source, namespace, group).await
    }

    async fn replace_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        payload: &RuleGroup,
    ) -> Result<OperationResult> {
        self.calls.lock().await.push(RecordedCall::Replace {
            namespace: namespace.to_string(),
            group: payload.clone(),
        });

        if let Some(err) = self.failures.lock().await.replace.pop_front() {
            return Err(err);
        }
        self.inner.replace_group(source, namespace, payload).await
    }

    async fn delete_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<OperationResult> {
        self.calls.lock().await.push(RecordedCall::Delete {
            namespace: namespace.to_string(),
            group: group.to_string(),
        });

        if let Some(err) = self.failures.lock().await.delete.pop_front() {
            return Err(err);
        }
        self.inner.delete_group(source, namespace, group).await
    }
}
