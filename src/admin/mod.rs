//! Dynamic upstream endpoint.
//!
//! # Routes
//! - `GET <path>`: run one list/add/remove/update operation and return the listing
//! - `HEAD <path>`: empty 200 response, no operation
//! - `GET /status`: JSON summary of every group
//!
//! Every route requires `Authorization: Bearer <api_key>` when a key is configured.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::require_api_key;
use self::handlers::{dynamic_upstream, get_status, head_only, AppState};

pub const STATUS_PATH: &str = "/status";

pub fn setup_admin_router(state: AppState, path: &str) -> Router {
    Router::new()
        .route(path, get(dynamic_upstream).head(head_only))
        .route(STATUS_PATH, get(get_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}
