//! Mutation orchestrator
//!
//! Drives one mutation end to end:
//!
//! 1. mark the request pending
//! 2. resolve the source configuration and reject unsupported actions
//! 3. fetch the current group (always a fresh read)
//! 4. reduce, plan and execute
//! 5. record success or failure, returning the same error to the caller
//!
//! Concurrent `apply` calls against the same group are not serialized: the
//! last write wins on the whole group. Fetching right before each mutation
//! keeps the stale window short but does not close it.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::SourceResolver;
use crate::core::executor::{execute, MutationOutcome};
use crate::core::planner::{plan, validate_action};
use crate::core::reducer::reduce;
use crate::error::{Result, RulerError};
use crate::model::{Action, Rule, RuleGroupIdentifier};
use crate::request_state::{combine, CombinedRequestState, RequestState};
use crate::store::RuleGroupStore;

/// Lifecycle state of one orchestrated mutation
pub type MutationState = RequestState<MutationOutcome, RulerError>;

/// Per-target states of a batch plus their aggregate
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One state per target, in input order
    pub states: Vec<MutationState>,
    pub combined: CombinedRequestState<MutationOutcome, RulerError>,
}

/// Applies actions to remotely stored rule groups
pub struct MutationOrchestrator<S, R> {
    store: Arc<S>,
    resolver: Arc<R>,
    state: watch::Sender<MutationState>,
}

impl<S: RuleGroupStore, R: SourceResolver> MutationOrchestrator<S, R> {
    pub fn new(store: S, resolver: R) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(resolver))
    }

    pub fn from_shared(store: Arc<S>, resolver: Arc<R>) -> Self {
        let (state, _) = watch::channel(MutationState::uninitialized());
        Self {
            store,
            resolver,
            state,
        }
    }

    /// A new orchestrator sharing the store and resolver, with its own state
    pub fn fork(&self) -> Self {
        Self::from_shared(Arc::clone(&self.store), Arc::clone(&self.resolver))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the current request state
    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    pub fn reset(&self) {
        self.state.send_replace(MutationState::uninitialized());
    }

    /// Apply an action to the group at `identifier`.
    ///
    /// The error returned here is the one recorded in [`Self::state`].
    pub async fn apply(
        &self,
        identifier: &RuleGroupIdentifier,
        action: Action,
    ) -> Result<MutationOutcome> {
        debug!("Applying {} to rule group {}", action.kind(), identifier);
        self.state.send_replace(MutationState::pending());

        match self.run(identifier, &action).await {
            Ok(outcome) => {
                info!(
                    "Applied {} to rule group {} ({} store operations)",
                    action.kind(),
                    identifier,
                    outcome.operations.len()
                );
                self.state
                    .send_replace(MutationState::succeeded(outcome.clone()));
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "Failed to apply {} to rule group {}: {}",
                    action.kind(),
                    identifier,
                    err
                );
                self.state.send_replace(MutationState::failed(err.clone()));
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        identifier: &RuleGroupIdentifier,
        action: &Action,
    ) -> Result<MutationOutcome> {
        let source = self.resolver.resolve(&identifier.source_name).await?;
        validate_action(identifier, action, &source)?;

        let current = self
            .store
            .fetch_group(
                &source,
                &identifier.namespace_name,
                &identifier.group_name,
            )
            .await?;

        let reduced = reduce(&current, action)?;
        let plan = plan(identifier, action, reduced);
        debug!("Planned {} for rule group {}", plan, identifier);

        execute(self.store.as_ref(), &source, plan).await
    }

    /// Pause (`true`) or resume (`false`) evaluation of one rule
    pub async fn pause_rule(
        &self,
        identifier: &RuleGroupIdentifier,
        uid: impl Into<String>,
        pause: bool,
    ) -> Result<MutationOutcome> {
        self.apply(
            identifier,
            Action::Pause {
                uid: uid.into(),
                pause,
            },
        )
        .await
    }

    /// Delete one rule; an emptied group is deleted as a whole
    pub async fn delete_rule(
        &self,
        identifier: &RuleGroupIdentifier,
        rule: Rule,
    ) -> Result<MutationOutcome> {
        self.apply(identifier, Action::Delete { rule }).await
    }

    pub async fn update_interval(
        &self,
        identifier: &RuleGroupIdentifier,
        interval: impl Into<String>,
    ) -> Result<MutationOutcome> {
        self.apply(
            identifier,
            Action::UpdateInterval {
                interval: interval.into(),
            },
        )
        .await
    }

    pub async fn rename_group(
        &self,
        identifier: &RuleGroupIdentifier,
        new_group_name: impl Into<String>,
        new_interval: Option<String>,
    ) -> Result<MutationOutcome> {
        self.apply(
            identifier,
            Action::RenameGroup {
                new_group_name: new_group_name.into(),
                new_interval,
            },
        )
        .await
    }

    pub async fn move_group(
        &self,
        identifier: &RuleGroupIdentifier,
        new_namespace_name: impl Into<String>,
        new_group_name: Option<String>,
        new_interval: Option<String>,
    ) -> Result<MutationOutcome> {
        self.apply(
            identifier,
            Action::MoveGroup {
                new_namespace_name: new_namespace_name.into(),
                new_group_name,
                new_interval,
            },
        )
        .await
    }

    /// Pause or resume several rules.
    ///
    /// Rules in different groups are processed concurrently; rules sharing a
    /// group are applied one after another so they do not overwrite each
    /// other's writes. Each target gets its own request state.
    pub async fn pause_rules(
        &self,
        targets: &[(RuleGroupIdentifier, String)],
        pause: bool,
    ) -> BatchOutcome {
        let mut by_group: Vec<(RuleGroupIdentifier, Vec<usize>)> = Vec::new();
        for (index, (identifier, _)) in targets.iter().enumerate() {
            match by_group.iter_mut().find(|(id, _)| id == identifier) {
                Some((_, indices)) => indices.push(index),
                None => by_group.push((identifier.clone(), vec![index])),
            }
        }

        let chains = by_group.into_iter().map(|(identifier, indices)| {
            let worker = self.fork();
            async move {
                let mut states = Vec::with_capacity(indices.len());
                for index in indices {
                    let uid = targets[index].1.clone();
                    let state = match worker.pause_rule(&identifier, uid, pause).await {
                        Ok(outcome) => MutationState::succeeded(outcome),
                        Err(err) => MutationState::failed(err),
                    };
                    states.push((index, state));
                }
                states
            }
        });

        let mut indexed: Vec<(usize, MutationState)> =
            join_all(chains).await.into_iter().flatten().collect();
        indexed.sort_by_key(|(index, _)| *index);

        let states: Vec<MutationState> = indexed.into_iter().map(|(_, state)| state).collect();
        let combined = combine(&states);
        BatchOutcome { states, combined }
    }
}
