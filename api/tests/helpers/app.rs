//! Shared setup for API integration tests.

use api::routes::routes;
use axum::Router;
use db::test_utils::setup_test_db;
use util::state::AppState;

/// Builds an app router backed by a fresh in-memory database.
///
/// The router mirrors production wiring minus the request-logging middleware,
/// which needs `ConnectInfo` from a real socket.
pub async fn make_test_app() -> (Router, AppState) {
    let db = setup_test_db().await;
    let state = AppState::new(db);
    let app = Router::new().nest("/api", routes(state.clone()));
    (app, state)
}

/// Returns a valid bearer token for an administrator.
pub fn admin_token() -> String {
    api::auth::generate_jwt(1, true).0
}

/// Returns a valid bearer token for a non-admin user.
pub fn student_token() -> String {
    api::auth::generate_jwt(2, false).0
}
