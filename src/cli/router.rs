//! Command routing and execution
//!
//! This module handles routing CLI commands to the orchestrator.

use anyhow::{anyhow, Result};
use serde_json::json;

use crate::cli::args::Commands;
use crate::config::{MutatorConfig, SourceResolver};
use crate::model::{Rule, RuleGroupIdentifier};
use crate::orchestrator::MutationOrchestrator;
use crate::store::{HttpRulerStore, RuleGroupStore};

/// Execute a CLI command against the configured ruler
pub async fn execute_command(command: Commands, config: &MutatorConfig) -> Result<()> {
    let store = HttpRulerStore::new(&config.ruler)?;
    let orchestrator = MutationOrchestrator::new(store, config.resolver());
    run(&orchestrator, command).await
}

/// Run a command with any store and resolver, printing the outcome as JSON
pub async fn run<S, R>(orchestrator: &MutationOrchestrator<S, R>, command: Commands) -> Result<()>
where
    S: RuleGroupStore,
    R: SourceResolver,
{
    let outcome = match command {
        Commands::Pause { target, uids } => {
            return run_pause(orchestrator, target.identifier(), uids, true).await
        }
        Commands::Resume { target, uids } => {
            return run_pause(orchestrator, target.identifier(), uids, false).await
        }
        Commands::DeleteRule { target, uid } => {
            orchestrator
                .delete_rule(&target.identifier(), Rule::new(uid))
                .await?
        }
        Commands::SetInterval { target, interval } => {
            orchestrator
                .update_interval(&target.identifier(), interval)
                .await?
        }
        Commands::Rename {
            target,
            to,
            interval,
        } => {
            orchestrator
                .rename_group(&target.identifier(), to, interval)
                .await?
        }
        Commands::Move {
            target,
            to_namespace,
            to_group,
            interval,
        } => {
            orchestrator
                .move_group(&target.identifier(), to_namespace, to_group, interval)
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn run_pause<S, R>(
    orchestrator: &MutationOrchestrator<S, R>,
    identifier: RuleGroupIdentifier,
    uids: Vec<String>,
    pause: bool,
) -> Result<()>
where
    S: RuleGroupStore,
    R: SourceResolver,
{
    let targets: Vec<_> = uids
        .into_iter()
        .map(|uid| (identifier.clone(), uid))
        .collect();
    let batch = orchestrator.pause_rules(&targets, pause).await;

    let report: Vec<_> = targets
        .iter()
        .zip(&batch.states)
        .map(|((_, uid), state)| match state.error() {
            Some(err) => json!({"uid": uid, "status": "error", "error": err.to_string()}),
            None => json!({"uid": uid, "status": "ok", "paused": pause}),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);

    match batch.combined.error {
        Some(err) => Err(anyhow!(err)),
        None => Ok(()),
    }
}
