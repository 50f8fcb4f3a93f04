//! # rulegroup-mutator
//!
//! Safe single-rule mutations over rule stores that can only replace or
//! delete whole rule groups.
//!
//! ## Usage
//!
//! ```bash
//! rgmut pause --source grafana --namespace ops --group g1 --uid r1
//! ```
//!
//! ## Modules
//!
//! - `config` - Configuration loading and source resolution
//! - `core` - Reducer, planner and plan execution
//! - `error` - Error taxonomy shared by every layer
//! - `model` - Rule groups, rules, identifiers and actions
//! - `orchestrator` - Fetch, reduce, plan, execute, with request state tracking
//! - `request_state` - Request lifecycle state and aggregation
//! - `store` - Whole-group store abstraction with memory and HTTP backends
//! - `testing` - Recording store for asserting call order in tests
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod request_state;
pub mod store;

pub mod testing;

pub use error::{Result, RulerError};
pub use model::{Action, Rule, RuleGroup, RuleGroupIdentifier, RulerSource, SourceKind};
pub use orchestrator::{MutationOrchestrator, MutationState};
