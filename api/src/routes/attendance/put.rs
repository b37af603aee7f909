use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::NaiveTime;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use util::state::AppState;

use super::common::{SetWindowReq, WindowConfigResponse};
use db::models::attendance_window::Model as Window;

/// PUT /api/attendance/window
///
/// **Auth**: admin. Inserts the first-ever window configuration (attributed
/// to the acting administrator) or updates the existing one in place.
/// `opening_time` and `closing_time` must be `HH:MM:SS`.
pub async fn set_window(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<SetWindowReq>,
) -> (StatusCode, Json<ApiResponse<Option<WindowConfigResponse>>>) {
    for (field, value) in [
        ("opening_time", &body.opening_time),
        ("closing_time", &body.closing_time),
    ] {
        if NaiveTime::parse_from_str(value, "%H:%M:%S").is_err() {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::error(format!("{field} must be HH:MM:SS"))),
            );
        }
    }

    match Window::set_window(
        state.db(),
        claims.sub,
        &body.opening_time,
        &body.closing_time,
        body.is_enabled,
    )
    .await
    {
        Ok(cfg) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(WindowConfigResponse::from(cfg)),
                "Attendance window updated",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to update attendance window: {e}"
            ))),
        ),
    }
}
