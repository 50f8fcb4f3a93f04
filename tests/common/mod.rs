//! Common test utilities and helpers

#![allow(dead_code)]

use rulegroup_mutator::config::StaticSourceResolver;
use rulegroup_mutator::store::MemoryRuleStore;
use rulegroup_mutator::testing::RecordingStore;
use rulegroup_mutator::{MutationOrchestrator, Rule, RuleGroup, RulerSource};

pub type TestOrchestrator =
    MutationOrchestrator<RecordingStore<MemoryRuleStore>, StaticSourceResolver>;

/// Builder for an orchestrator over a seeded in-memory store
pub struct TestContextBuilder {
    sources: Vec<RulerSource>,
    groups: Vec<(String, String, RuleGroup)>,
}

impl TestContextBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Register an additional rule source
    pub fn with_source(mut self, source: RulerSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Seed a group under the given source uid and namespace
    pub fn with_group(mut self, source_uid: &str, namespace: &str, group: RuleGroup) -> Self {
        self.groups
            .push((source_uid.to_string(), namespace.to_string(), group));
        self
    }

    pub async fn build(self) -> TestOrchestrator {
        let memory = MemoryRuleStore::new();
        for (source_uid, namespace, group) in self.groups {
            memory.seed(&source_uid, &namespace, group).await;
        }
        MutationOrchestrator::new(
            RecordingStore::new(memory),
            StaticSourceResolver::new(self.sources),
        )
    }
}

/// A rule with the given uid and paused flag
pub fn rule(uid: &str, paused: bool) -> Rule {
    Rule {
        paused,
        ..Rule::new(uid)
    }
}

/// `{name: "g1", interval: "1m", rules: [r1, r2]}`, both unpaused
pub fn g1_with_two_rules() -> RuleGroup {
    RuleGroup::new(
        "g1",
        Some("1m".to_string()),
        vec![rule("r1", false), rule("r2", false)],
    )
}

/// `{name: "g1", interval: "1m", rules: [r1]}`
pub fn g1_with_one_rule() -> RuleGroup {
    RuleGroup::new("g1", Some("1m".to_string()), vec![rule("r1", false)])
}
