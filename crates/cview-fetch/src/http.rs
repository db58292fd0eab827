//! `reqwest`-backed [`ClusterApi`].
//!
//! Each read is a single GET against `endpoint + path`. Non-2xx statuses and
//! undecodable bodies are failures. With `retries > 0` a failed read is
//! re-issued after `retry_backoff`; the default performs exactly one attempt.

use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use cview_types::{AgentInfo, ControllerInfo, FeatureGate, NodeIPLatencyStatsInfo, ResourceList};

use crate::{ApiConfig, ClusterApi, FetchError, FetchFuture};

/// HTTP client for the summary backend.
#[derive(Debug, Clone)]
pub struct HttpClusterApi {
    client: Client,
    config: ApiConfig,
}

impl HttpClusterApi {
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        Url::parse(&config.endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("'{}': {e}", config.endpoint)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("cview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
    ) -> Result<T, FetchError> {
        let url = Url::parse(&self.config.resource_url(path))
            .map_err(|e| FetchError::InvalidUrl(format!("{resource}: {e}")))?;

        let mut attempt = 0u32;
        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.retries => {
                    attempt += 1;
                    tracing::debug!(resource, attempt, error = %e, "Retrying fetch");
                    tokio::time::sleep(self.config.retry_backoff()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(e, url))?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
    ) -> Result<Vec<T>, FetchError> {
        self.get_json::<ResourceList<T>>(resource, path)
            .await
            .map(ResourceList::into_vec)
    }
}

fn classify(e: reqwest::Error, url: &Url) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Http(e)
    }
}

impl ClusterApi for HttpClusterApi {
    fn fetch_controller_info(&self) -> FetchFuture<'_, ControllerInfo> {
        Box::pin(self.get_json("controller", &self.config.controller_path))
    }

    fn fetch_agent_infos(&self) -> FetchFuture<'_, Vec<AgentInfo>> {
        Box::pin(self.get_list("agents", &self.config.agents_path))
    }

    fn fetch_feature_gates(&self) -> FetchFuture<'_, Vec<FeatureGate>> {
        Box::pin(self.get_list("feature_gates", &self.config.feature_gates_path))
    }

    fn fetch_node_ip_latency_stats(&self) -> FetchFuture<'_, Vec<NodeIPLatencyStatsInfo>> {
        Box::pin(self.get_list("latency", &self.config.latency_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_endpoint() {
        let err = HttpClusterApi::new(ApiConfig::with_endpoint("not a url")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
