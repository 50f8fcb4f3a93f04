//! Resolving a source name to the configuration needed to address its store

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{Result, RulerError};
use crate::model::RulerSource;

/// Looks up per-source configuration before a mutation touches the store
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, source_name: &str) -> Result<RulerSource>;
}

/// Resolver over a fixed set of sources.
///
/// The Grafana-managed source is registered unless the configuration
/// overrides it under the same name.
#[derive(Debug, Clone)]
pub struct StaticSourceResolver {
    sources: HashMap<String, RulerSource>,
}

impl StaticSourceResolver {
    pub fn new(sources: Vec<RulerSource>) -> Self {
        let grafana = RulerSource::grafana();
        let mut by_name = HashMap::from([(grafana.name.clone(), grafana)]);
        by_name.extend(sources.into_iter().map(|s| (s.name.clone(), s)));
        Self { sources: by_name }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for StaticSourceResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl SourceResolver for StaticSourceResolver {
    async fn resolve(&self, source_name: &str) -> Result<RulerSource> {
        self.sources.get(source_name).cloned().ok_or_else(|| {
            RulerError::configuration(format!(
                "unknown rule source '{}' (known: {})",
                source_name,
                self.names().join(", ")
            ))
        })
    }
}
