//! Backend endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTROLLER_PATH: &str =
    "/api/v1/k8s/apis/crd.antrea.io/v1beta1/antreacontrollerinfos/antrea-controller";
pub const DEFAULT_AGENTS_PATH: &str = "/api/v1/k8s/apis/crd.antrea.io/v1beta1/antreaagentinfos";
pub const DEFAULT_FEATURE_GATES_PATH: &str = "/api/v1/featuregates";
pub const DEFAULT_LATENCY_PATH: &str = "/api/v1/nodelatencystats";

/// Where and how to reach the summary backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080`.
    pub endpoint: String,
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout_secs: u64,
    /// Extra attempts after a failed read. 0 disables retries.
    pub retries: u32,
    /// Pause between attempts.
    pub retry_backoff_ms: u64,
    pub controller_path: String,
    pub agents_path: String,
    pub feature_gates_path: String,
    pub latency_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080".to_string(),
            request_timeout_secs: 10,
            retries: 0,
            retry_backoff_ms: 500,
            controller_path: DEFAULT_CONTROLLER_PATH.to_string(),
            agents_path: DEFAULT_AGENTS_PATH.to_string(),
            feature_gates_path: DEFAULT_FEATURE_GATES_PATH.to_string(),
            latency_path: DEFAULT_LATENCY_PATH.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Join the base endpoint and a resource path without losing any path
    /// prefix the endpoint carries.
    pub fn resource_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_url_keeps_prefix() {
        let cfg = ApiConfig::with_endpoint("https://ui.example.com/dashboard/");
        assert_eq!(
            cfg.resource_url("/api/v1/featuregates"),
            "https://ui.example.com/dashboard/api/v1/featuregates"
        );
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg: ApiConfig = from_json(r#"{"endpoint": "http://10.0.0.1:8080", "retries": 2}"#);
        assert_eq!(cfg.endpoint, "http://10.0.0.1:8080");
        assert_eq!(cfg.retries, 2);
        assert_eq!(cfg.latency_path, DEFAULT_LATENCY_PATH);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    fn from_json(json: &str) -> ApiConfig {
        serde_json::from_str(json).unwrap()
    }
}
