//! Ruler API payload shapes
//!
//! The ruler speaks two rule dialects and neither matches [`Rule`] directly:
//!
//! - Grafana-managed rules keep identity and pause state inside the
//!   `grafana_alert` object (`grafana_alert.uid`, `grafana_alert.is_paused`).
//! - Data source rules (Prometheus, Mimir, Loki) have no uid and no pause
//!   flag; a rule is identified by its `alert` or `record` name.
//!
//! Everything else in a rule is carried through verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RulerError};
use crate::model::{Rule, RuleGroup, SourceKind};

const GRAFANA_ALERT: &str = "grafana_alert";
const UID: &str = "uid";
const IS_PAUSED: &str = "is_paused";

/// A rule group as the ruler API sends and accepts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRuleGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default)]
    pub rules: Vec<Map<String, Value>>,
}

impl WireRuleGroup {
    /// Decode into the protocol model
    pub fn into_group(self, kind: SourceKind) -> Result<RuleGroup> {
        let rules = self
            .rules
            .into_iter()
            .map(|raw| match kind {
                SourceKind::Grafana => decode_grafana_rule(raw),
                SourceKind::DataSource => decode_data_source_rule(raw),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleGroup::new(self.name, self.interval, rules))
    }

    /// Encode a protocol group for the ruler
    pub fn from_group(group: &RuleGroup, kind: SourceKind) -> Result<Self> {
        let rules = group
            .rules
            .iter()
            .map(|rule| match kind {
                SourceKind::Grafana => Ok(encode_grafana_rule(rule)),
                SourceKind::DataSource => encode_data_source_rule(rule),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: group.name.clone(),
            interval: group.interval.clone(),
            rules,
        })
    }
}

fn decode_grafana_rule(mut raw: Map<String, Value>) -> Result<Rule> {
    let Some(Value::Object(mut alert)) = raw.remove(GRAFANA_ALERT) else {
        return Err(RulerError::serialization(
            "Grafana-managed rule is missing the grafana_alert object",
        ));
    };

    let uid = match alert.remove(UID) {
        Some(Value::String(uid)) if !uid.is_empty() => uid,
        _ => {
            return Err(RulerError::serialization(
                "Grafana-managed rule is missing grafana_alert.uid",
            ))
        }
    };
    let paused = alert
        .remove(IS_PAUSED)
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if !alert.is_empty() {
        raw.insert(GRAFANA_ALERT.to_string(), Value::Object(alert));
    }

    Ok(Rule {
        uid,
        paused,
        spec: raw,
    })
}

fn encode_grafana_rule(rule: &Rule) -> Map<String, Value> {
    let mut raw = rule.spec.clone();
    let mut alert = match raw.remove(GRAFANA_ALERT) {
        Some(Value::Object(alert)) => alert,
        _ => Map::new(),
    };
    alert.insert(UID.to_string(), Value::String(rule.uid.clone()));
    alert.insert(IS_PAUSED.to_string(), Value::Bool(rule.paused));
    raw.insert(GRAFANA_ALERT.to_string(), Value::Object(alert));
    raw
}

/// `alert` or `record` name of a data source rule
fn data_source_rule_name(raw: &Map<String, Value>) -> Option<&str> {
    ["alert", "record"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .filter(|name| !name.is_empty())
}

fn decode_data_source_rule(raw: Map<String, Value>) -> Result<Rule> {
    let uid = data_source_rule_name(&raw)
        .ok_or_else(|| {
            RulerError::serialization("data source rule has neither an alert nor a record name")
        })?
        .to_string();

    Ok(Rule {
        uid,
        paused: false,
        spec: raw,
    })
}

fn encode_data_source_rule(rule: &Rule) -> Result<Map<String, Value>> {
    if rule.paused {
        return Err(RulerError::precondition(format!(
            "rule '{}' cannot be paused: data source rules have no pause state",
            rule.uid
        )));
    }
    if data_source_rule_name(&rule.spec).is_none() {
        return Err(RulerError::validation(format!(
            "rule '{}' has neither an alert nor a record name",
            rule.uid
        )));
    }
    Ok(rule.spec.clone())
}
