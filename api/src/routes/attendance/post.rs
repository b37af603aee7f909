use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::common::format_validation_errors;
use util::state::AppState;

use super::common::{AttendanceRecordResponse, SubmitAttendanceReq};
use db::models::attendance_record::{Model as Record, NewSubmission, SubmissionError};

/// POST /api/attendance/submit
///
/// Runs the submission decision core: required fields, attendance window,
/// geolocation presence, geofence, duplicate guard, then the persisted
/// insert. The first failing step short-circuits with its own status code.
pub async fn submit_attendance(
    State(state): State<AppState>,
    Json(body): Json<SubmitAttendanceReq>,
) -> (
    StatusCode,
    Json<ApiResponse<Option<AttendanceRecordResponse>>>,
) {
    if let Err(errors) = body.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(format_validation_errors(&errors))),
        );
    }

    let attempt = NewSubmission {
        student_name: body.student_name,
        roll_number: body.roll_number,
        section: body.section,
        event: body.event,
        device_id: body.device_id,
        location: body.location,
    };

    match Record::submit(state.db(), attempt, Utc::now()).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(AttendanceRecordResponse::from(record)),
                "Your attendance has been marked successfully!",
            )),
        ),
        Err(e) => {
            let status = match &e {
                SubmissionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SubmissionError::WindowClosed(_) => StatusCode::FORBIDDEN,
                SubmissionError::LocationUnavailable => StatusCode::BAD_REQUEST,
                SubmissionError::OutOfRange { .. } => StatusCode::FORBIDDEN,
                SubmissionError::Duplicate => StatusCode::CONFLICT,
                SubmissionError::Persistence(err) => {
                    tracing::error!(error = %err, "failed to persist attendance record");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}
