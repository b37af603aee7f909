use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};
use util::state::AppState;

mod common;
mod get;
mod post;
mod put;

pub use get::{export_records_csv, get_qr_link, get_window, get_window_status, list_records};
pub use post::submit_attendance;
pub use put::set_window;

use crate::auth::guards::allow_admin;

/// Builds the `/attendance` route group.
///
/// Submission and window status are public (students are not authenticated);
/// configuration, record access, export, and QR provisioning are admin-only.
pub fn attendance_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/submit", post(submit_attendance))
        .route("/window/status", get(get_window_status))
        .route("/window", get(get_window).route_layer(from_fn(allow_admin)))
        .route("/window", put(set_window).route_layer(from_fn(allow_admin)))
        .route(
            "/records",
            get(list_records).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/records/export",
            get(export_records_csv).route_layer(from_fn(allow_admin)),
        )
        .route("/qr-link", get(get_qr_link).route_layer(from_fn(allow_admin)))
        .with_state(app_state)
}
