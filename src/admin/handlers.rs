use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::dynamic::{DynamicUpstream, QueryParams};
use crate::error::{ErrorKind, UpstreamError};
use crate::upstream::group::ZoneUsage;

const TEXT_PLAIN: &str = "text/plain";

/// State shared by the dynamic upstream handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<DynamicUpstream>,
    pub api_key: Option<Arc<str>>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub upstreams: Vec<UpstreamStatus>,
}

#[derive(Debug, Serialize)]
pub struct UpstreamStatus {
    pub name: String,
    pub peers: usize,
    pub zone: ZoneUsage,
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InvalidNumber => StatusCode::BAD_REQUEST,
            ErrorKind::GroupNotFound
            | ErrorKind::OperationFailed
            | ErrorKind::AllocationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, [(CONTENT_TYPE, TEXT_PLAIN)], format!("{self}\n")).into_response()
    }
}

/// Run one operation. Parameters are passed through in request order.
pub async fn dynamic_upstream(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params: QueryParams = pairs.into_iter().collect();
    let engine = Arc::clone(&state.engine);

    // The group lock and name resolution both block
    match tokio::task::spawn_blocking(move || engine.execute(&params)).await {
        Ok(Ok(listing)) => (StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN)], listing).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dynamic upstream task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// HEAD answers with headers only and never touches a group.
pub async fn head_only() -> impl IntoResponse {
    (StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN)])
}

pub async fn get_status(State(state): State<AppState>) -> Response {
    let engine = Arc::clone(&state.engine);
    let collect = move || {
        engine
            .registry()
            .groups()
            .iter()
            .map(|group| UpstreamStatus {
                name: group.name().to_string(),
                peers: group.peers().len(),
                zone: group.zone_usage(),
            })
            .collect::<Vec<_>>()
    };

    match tokio::task::spawn_blocking(collect).await {
        Ok(upstreams) => Json(SystemStatus {
            version: env!("CARGO_PKG_VERSION"),
            status: "operational",
            upstreams,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Status task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
