//! HttpClusterApi against an in-process axum backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cview_fetch::{ApiConfig, ClusterApi, FetchError, HttpClusterApi};

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn backend() -> Router {
    let cfg = ApiConfig::default();
    Router::new()
        .route(
            &cfg.controller_path,
            get(|| async {
                Json(serde_json::json!({
                    "metadata": { "name": "antrea-controller" },
                    "version": "v2.1.0",
                    "connectedAgentNum": 2
                }))
            }),
        )
        .route(
            &cfg.agents_path,
            get(|| async {
                Json(serde_json::json!({
                    "items": [
                        { "metadata": { "name": "agent-a" }, "localPodNum": 4 },
                        { "metadata": { "name": "agent-b" }, "localPodNum": 1 }
                    ]
                }))
            }),
        )
        .route(
            &cfg.feature_gates_path,
            get(|| async {
                Json(serde_json::json!([
                    { "component": "controller", "name": "Traceflow", "status": "Enabled", "version": "BETA" }
                ]))
            }),
        )
        .route(
            &cfg.latency_path,
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "node latency monitor disabled") }),
        )
}

#[tokio::test]
async fn test_reads_single_object_and_item_lists() {
    let endpoint = spawn_backend(backend()).await;
    let api = HttpClusterApi::new(ApiConfig::with_endpoint(endpoint)).unwrap();

    let controller = api.fetch_controller_info().await.unwrap();
    assert_eq!(controller.name(), "antrea-controller");
    assert_eq!(controller.connected_agent_num, 2);

    let agents = api.fetch_agent_infos().await.unwrap();
    let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["agent-a", "agent-b"]);

    let gates = api.fetch_feature_gates().await.unwrap();
    assert_eq!(gates.len(), 1);
    assert_eq!(gates[0].name, "Traceflow");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let endpoint = spawn_backend(backend()).await;
    let api = HttpClusterApi::new(ApiConfig::with_endpoint(endpoint)).unwrap();

    match api.fetch_node_ip_latency_stats().await {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/api/v1/nodelatencystats"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let cfg = ApiConfig::default();
    let app = Router::new().route(&cfg.feature_gates_path, get(|| async { "not json" }));
    let endpoint = spawn_backend(app).await;
    let api = HttpClusterApi::new(ApiConfig::with_endpoint(endpoint)).unwrap();

    let err = api.fetch_feature_gates().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_retries_reissue_failed_reads() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let cfg = ApiConfig::default();
    let app = Router::new().route(
        &cfg.latency_path,
        get(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(StatusCode::BAD_GATEWAY)
                } else {
                    Ok(Json(serde_json::json!([
                        { "nodeName": "A", "nodeIPLatencyList": [ { "nodeName": "B", "lastMeasuredRTT": 1500 } ] }
                    ])))
                }
            }
        }),
    );
    let endpoint = spawn_backend(app).await;

    let mut config = ApiConfig::with_endpoint(endpoint);
    config.retries = 1;
    config.retry_backoff_ms = 10;
    let api = HttpClusterApi::new(config).unwrap();

    let stats = api.fetch_node_ip_latency_stats().await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].node_ip_latency_list[0].last_measured_rtt, 1500);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let cfg = ApiConfig::default();
    let app = Router::new().route(
        &cfg.agents_path,
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }),
    );
    let endpoint = spawn_backend(app).await;
    let api = HttpClusterApi::new(ApiConfig::with_endpoint(endpoint)).unwrap();

    assert!(api.fetch_agent_infos().await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
