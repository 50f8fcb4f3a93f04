//! Data model for rule groups and the actions that mutate them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Coordinates of one remotely stored rule group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroupIdentifier {
    /// Name of the rule source (ruler) the group lives in
    pub source_name: String,
    /// Namespace (folder) holding the group
    pub namespace_name: String,
    /// Group name, unique within the namespace
    pub group_name: String,
}

impl RuleGroupIdentifier {
    pub fn new(
        source_name: impl Into<String>,
        namespace_name: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            namespace_name: namespace_name.into(),
            group_name: group_name.into(),
        }
    }

    /// Same source and namespace, different group name
    pub fn with_group(&self, group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            ..self.clone()
        }
    }

    /// Same source, different namespace and group name
    pub fn in_namespace(
        &self,
        namespace_name: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            source_name: self.source_name.clone(),
            namespace_name: namespace_name.into(),
            group_name: group_name.into(),
        }
    }
}

impl fmt::Display for RuleGroupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.source_name, self.namespace_name, self.group_name
        )
    }
}

/// A single rule. Only `uid` and `paused` are meaningful to the mutation
/// protocol; everything else is carried through untouched.
///
/// This is the protocol shape, not the ruler's; see [`crate::store::wire`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub uid: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(flatten)]
    pub spec: Map<String, Value>,
}

impl Rule {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            paused: false,
            spec: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.spec.insert(key.into(), value);
        self
    }
}

/// The unit the store replaces atomically. Rule order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>, interval: Option<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            interval,
            rules,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains_rule(&self, uid: &str) -> bool {
        self.rules.iter().any(|rule| rule.uid == uid)
    }

    /// Same rules under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// A requested change to a single rule group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Pause or resume evaluation of one rule
    Pause { uid: String, pause: bool },
    /// Remove one rule from the group
    Delete { rule: Rule },
    /// Rename the group within its namespace
    #[serde(rename_all = "camelCase")]
    RenameGroup {
        new_group_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_interval: Option<String>,
    },
    /// Move the group into another namespace, optionally renaming it
    #[serde(rename_all = "camelCase")]
    MoveGroup {
        new_namespace_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_group_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_interval: Option<String>,
    },
    /// Change the evaluation interval
    UpdateInterval { interval: String },
}

/// Action tags, for logging and pattern matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Pause,
    Delete,
    RenameGroup,
    MoveGroup,
    UpdateInterval,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Pause { .. } => ActionKind::Pause,
            Action::Delete { .. } => ActionKind::Delete,
            Action::RenameGroup { .. } => ActionKind::RenameGroup,
            Action::MoveGroup { .. } => ActionKind::MoveGroup,
            Action::UpdateInterval { .. } => ActionKind::UpdateInterval,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Pause => "pause",
            ActionKind::Delete => "delete",
            ActionKind::RenameGroup => "rename-group",
            ActionKind::MoveGroup => "move-group",
            ActionKind::UpdateInterval => "update-interval",
        };
        f.write_str(name)
    }
}

/// Who manages the rules behind a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Rules evaluated by Grafana itself; namespaces are folders
    #[default]
    Grafana,
    /// Rules held by an external ruler (Prometheus, Mimir, Loki)
    DataSource,
}

/// Per-source configuration needed to address the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulerSource {
    /// Name callers use in a `RuleGroupIdentifier`
    pub name: String,
    /// Identifier used in store request paths
    pub uid: String,
    #[serde(default)]
    pub kind: SourceKind,
}

impl RulerSource {
    pub fn grafana() -> Self {
        Self {
            name: "grafana".to_string(),
            uid: "grafana".to_string(),
            kind: SourceKind::Grafana,
        }
    }

    pub fn data_source(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            kind: SourceKind::DataSource,
        }
    }

    pub fn is_grafana_managed(&self) -> bool {
        self.kind == SourceKind::Grafana
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_round_trips_opaque_fields() {
        let raw = json!({
            "uid": "r1",
            "paused": true,
            "title": "High latency",
            "data": [{"refId": "A"}]
        });

        let rule: Rule = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(rule.uid, "r1");
        assert!(rule.paused);
        assert_eq!(rule.spec.get("title"), Some(&json!("High latency")));
        assert_eq!(serde_json::to_value(&rule).unwrap(), raw);
    }

    #[test]
    fn test_rule_paused_defaults_to_false() {
        let rule: Rule = serde_json::from_value(json!({"uid": "r1"})).unwrap();
        assert!(!rule.paused);
    }

    #[test]
    fn test_identifier_display_and_derivations() {
        let id = RuleGroupIdentifier::new("grafana", "ops", "g1");
        assert_eq!(id.to_string(), "grafana/ops/g1");
        assert_eq!(id.with_group("g2").to_string(), "grafana/ops/g2");
        assert_eq!(id.in_namespace("infra", "g1").to_string(), "grafana/infra/g1");
    }

    #[test]
    fn test_action_serde_tagging() {
        let action: Action = serde_json::from_value(json!({
            "action": "moveGroup",
            "newNamespaceName": "infra"
        }))
        .unwrap();

        assert_eq!(
            action,
            Action::MoveGroup {
                new_namespace_name: "infra".to_string(),
                new_group_name: None,
                new_interval: None,
            }
        );
        assert_eq!(action.kind(), ActionKind::MoveGroup);
    }
}
