//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → health check endpoint (public)
//! - `/attendance` → submission, window configuration, records, export, QR
//!   provisioning (mixed public/admin, gated per route)

use axum::Router;
use util::state::AppState;

use crate::routes::attendance::attendance_routes;
use crate::routes::health::health_routes;

pub mod attendance;
pub mod common;
pub mod health;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/attendance", attendance_routes(app_state))
}
