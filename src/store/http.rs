//! Grafana ruler HTTP API store
//!
//! Request paths:
//!
//! ```text
//! GET    {base}/api/ruler/{source_uid}/api/v1/rules/{namespace}/{group}
//! POST   {base}/api/ruler/{source_uid}/api/v1/rules/{namespace}
//! DELETE {base}/api/ruler/{source_uid}/api/v1/rules/{namespace}/{group}
//! ```
//!
//! Payloads are translated through [`WireRuleGroup`] according to the
//! source kind. No retries are performed; a failed request surfaces
//! immediately.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::RulerHttpConfig;
use crate::error::{Result, RulerError};
use crate::model::{RuleGroup, RulerSource};
use crate::store::wire::WireRuleGroup;
use crate::store::{OperationResult, RuleGroupStore};

/// Store backed by a remote ruler over HTTP
#[derive(Debug, Clone)]
pub struct HttpRulerStore {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpRulerStore {
    /// Create a store from HTTP configuration
    pub fn new(config: &RulerHttpConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RulerError::configuration(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RulerError::configuration(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RulerError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    fn rules_url(&self, source: &RulerSource, namespace: &str, group: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RulerError::configuration("base URL cannot carry a path"))?;
            segments.pop_if_empty().extend([
                "api",
                "ruler",
                source.uid.as_str(),
                "api",
                "v1",
                "rules",
                namespace,
            ]);
            if let Some(group) = group {
                segments.push(group);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, body))
    }
}

/// Map a non-success HTTP status onto the error taxonomy
fn error_for_status(status: StatusCode, body: String) -> RulerError {
    let message = extract_message(&body).unwrap_or(body);
    match status {
        StatusCode::NOT_FOUND => RulerError::not_found(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RulerError::validation(message)
        }
        _ => RulerError::remote(Some(status.as_u16()), message),
    }
}

fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

async fn operation_result(response: Response) -> Result<OperationResult> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(OperationResult::default());
    }
    Ok(serde_json::from_str(&body).unwrap_or_else(|_| OperationResult::with_message(body)))
}

#[async_trait]
impl RuleGroupStore for HttpRulerStore {
    async fn fetch_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<RuleGroup> {
        let url = self.rules_url(source, namespace, Some(group))?;
        debug!("GET {}", url);

        let response = self.send(self.client.get(url)).await?;
        response
            .json::<WireRuleGroup>()
            .await?
            .into_group(source.kind)
    }

    async fn replace_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        payload: &RuleGroup,
    ) -> Result<OperationResult> {
        let url = self.rules_url(source, namespace, None)?;
        debug!("POST {} (group '{}', {} rules)", url, payload.name, payload.rules.len());

        let body = WireRuleGroup::from_group(payload, source.kind)?;
        let response = self.send(self.client.post(url).json(&body)).await?;
        operation_result(response).await
    }

    async fn delete_group(
        &self,
        source: &RulerSource,
        namespace: &str,
        group: &str,
    ) -> Result<OperationResult> {
        let url = self.rules_url(source, namespace, Some(group))?;
        debug!("DELETE {}", url);

        let response = self.send(self.client.delete(url)).await?;
        operation_result(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store(base_url: &str) -> HttpRulerStore {
        HttpRulerStore::new(&RulerHttpConfig {
            base_url: base_url.to_string(),
            api_token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_rules_url_encodes_segments() {
        let store = store("http://localhost:3000/grafana/");
        let source = RulerSource::data_source("mimir", "mimir-uid");

        let url = store
            .rules_url(&source, "team a/alerts", Some("cpu #1"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/grafana/api/ruler/mimir-uid/api/v1/rules/team%20a%2Falerts/cpu%20%231"
        );
    }

    #[test]
    fn test_rules_url_without_group() {
        let store = store("http://localhost:3000");
        let url = store
            .rules_url(&RulerSource::grafana(), "ops", None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/ruler/grafana/api/v1/rules/ops"
        );
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let result = HttpRulerStore::new(&RulerHttpConfig {
            base_url: "not a url".to_string(),
            api_token: None,
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(RulerError::Configuration(_))));
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(error_for_status(StatusCode::NOT_FOUND, String::new()).is_not_found());
        assert!(matches!(
            error_for_status(
                StatusCode::BAD_REQUEST,
                r#"{"message":"invalid interval"}"#.to_string()
            ),
            RulerError::Validation(ref m) if m == "invalid interval"
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            RulerError::Remote {
                status: Some(502),
                ..
            }
        ));
    }
}
