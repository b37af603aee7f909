use serde::{Deserialize, Serialize};
use validator::Validate;

use db::models::attendance_record::{Event, Model as AttendanceRecord, Section};
use db::models::attendance_window::Model as AttendanceWindow;
use util::geo::Coordinate;

/// Body of `POST /attendance/submit`.
///
/// `location` is whatever the client's geolocation produced; its absence is
/// the geolocation collaborator's failure mode, decided by the core.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttendanceReq {
    #[validate(length(min = 1, message = "Student name is required"))]
    pub student_name: String,
    #[validate(length(min = 1, message = "Roll number is required"))]
    pub roll_number: String,
    pub section: Section,
    pub event: Event,
    #[validate(length(min = 1, message = "Device id is required"))]
    pub device_id: String,
    pub location: Option<Coordinate>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceRecordResponse {
    pub id: i64,
    pub student_name: String,
    pub roll_number: String,
    pub section: Section,
    pub event: Event,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub created_at: String,
}

impl From<AttendanceRecord> for AttendanceRecordResponse {
    fn from(m: AttendanceRecord) -> Self {
        Self {
            id: m.id,
            student_name: m.student_name,
            roll_number: m.roll_number,
            section: m.section,
            event: m.event,
            latitude: m.latitude,
            longitude: m.longitude,
            location_name: m.location_name,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordsListQuery {
    pub section: Option<Section>,
    pub event: Option<Event>,
    /// Case-insensitive substring match over student name and roll number.
    pub q: Option<String>,
    /// `created_at` | `student_name` (prefix `-` for desc). Default `-created_at`.
    pub sort: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecordsListResponse {
    pub records: Vec<AttendanceRecordResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetWindowReq {
    pub opening_time: String,
    pub closing_time: String,
    pub is_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct WindowConfigResponse {
    pub opening_time: String,
    pub closing_time: String,
    pub is_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AttendanceWindow> for WindowConfigResponse {
    fn from(m: AttendanceWindow) -> Self {
        Self {
            opening_time: m.opening_time,
            closing_time: m.closing_time,
            is_enabled: m.is_enabled,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QrLinkQuery {
    pub section: Option<Section>,
    pub event: Option<Event>,
}

#[derive(Debug, Serialize)]
pub struct QrLinkResponse {
    pub url: String,
}
