//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use dynamic_upstream::config::{DynamicConfig, ServerConfig, UpstreamConfig};
use dynamic_upstream::lifecycle::bootstrap;
use dynamic_upstream::upstream::SystemResolver;
use dynamic_upstream::{AdminServer, DynamicUpstream};

/// Config with a `backend` group of two servers and an `api` group of one.
pub fn test_config() -> DynamicConfig {
    let mut config = DynamicConfig::default();
    config.observability.metrics_enabled = false;
    config.upstreams = vec![
        upstream("backend", &["10.0.0.1:80", "10.0.0.2:80"]),
        upstream("api", &["10.0.1.1:8080"]),
    ];
    config
}

pub fn upstream(name: &str, servers: &[&str]) -> UpstreamConfig {
    UpstreamConfig {
        name: name.to_string(),
        zone_size: 64 * 1024,
        servers: servers.iter().map(|s| ServerConfig::new(*s)).collect(),
    }
}

pub fn engine(config: &DynamicConfig) -> DynamicUpstream {
    bootstrap(config, Arc::new(SystemResolver)).unwrap()
}

pub fn router(config: &DynamicConfig) -> Router {
    AdminServer::new(config, engine(config)).router()
}

/// Send one request through the router and collect status and body text.
pub async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    send_with(router, Request::builder().method(method).uri(uri)).await
}

pub async fn send_with(
    router: &Router,
    builder: axum::http::request::Builder,
) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    send(router, Method::GET, uri).await
}
