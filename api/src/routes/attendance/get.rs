//! Attendance read-only routes: window status, window configuration,
//! record listing with filters, CSV export, and QR link provisioning.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select};
use url::Url;

use crate::response::ApiResponse;
use util::{config, state::AppState};

use super::common::{
    AttendanceRecordResponse, QrLinkQuery, QrLinkResponse, RecordsListQuery, RecordsListResponse,
    WindowConfigResponse,
};
use db::models::attendance_record::{Column as RecordCol, Entity as RecordEntity};
use db::models::attendance_window::{Model as Window, WindowStatus};

/// GET /api/attendance/window/status
///
/// Public: tells a student whether submissions are currently accepted and
/// why not otherwise. The message is the evaluator's verbatim output.
pub async fn get_window_status(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Option<WindowStatus>>>) {
    match Window::current(state.db()).await {
        Ok(config) => {
            let status = Window::status(config.as_ref(), Utc::now());
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Some(status),
                    "Attendance window status",
                )),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load attendance window");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "Database error retrieving attendance window",
                )),
            )
        }
    }
}

/// GET /api/attendance/window
///
/// **Auth**: admin. Returns the current window configuration, or `null` data
/// if none has been created yet.
pub async fn get_window(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Option<WindowConfigResponse>>>) {
    match Window::current(state.db()).await {
        Ok(Some(cfg)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(WindowConfigResponse::from(cfg)),
                "Attendance window retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::OK,
            Json(ApiResponse::success(None, "No attendance window configured")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to load attendance window");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "Database error retrieving attendance window",
                )),
            )
        }
    }
}

/// Applies section/event filters and the free-text search to a base select.
fn filtered_records(q: &RecordsListQuery) -> Select<RecordEntity> {
    let mut sel = RecordEntity::find();

    if let Some(section) = q.section.as_ref() {
        sel = sel.filter(RecordCol::Section.eq(section.clone()));
    }
    if let Some(event) = q.event.as_ref() {
        sel = sel.filter(RecordCol::Event.eq(event.clone()));
    }
    if let Some(raw) = q.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        // Lowered on both sides so matching is case-insensitive on every
        // backend, not just where LIKE happens to be.
        let needle = format!("%{}%", raw.to_lowercase());
        sel = sel.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(RecordCol::StudentName))).like(needle.clone()))
                .add(Expr::expr(Func::lower(Expr::col(RecordCol::RollNumber))).like(needle)),
        );
    }

    sel
}

/// GET /api/attendance/records
///
/// **Auth**: admin. List attendance records with pagination, sorting, and
/// filtering.
///
/// **Query**:
/// - `section`, `event` *(optional)*: exact filters
/// - `q` *(optional)*: substring match on student name or roll number
/// - `sort` *(optional)*: `created_at` | `student_name` (prefix `-` for desc)
/// - `page` *(default 1)*, `per_page` *(default 20, max 100)*
pub async fn list_records(
    State(state): State<AppState>,
    Query(q): Query<RecordsListQuery>,
) -> (StatusCode, Json<ApiResponse<RecordsListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = filtered_records(&q);
    sel = match q.sort.as_deref() {
        Some(sort) if sort.starts_with('-') => match &sort[1..] {
            "created_at" => sel.order_by_desc(RecordCol::CreatedAt),
            "student_name" => sel.order_by_desc(RecordCol::StudentName),
            _ => sel.order_by_desc(RecordCol::CreatedAt),
        },
        Some("created_at") => sel.order_by_asc(RecordCol::CreatedAt),
        Some("student_name") => sel.order_by_asc(RecordCol::StudentName),
        _ => sel
            .order_by_desc(RecordCol::CreatedAt)
            .order_by_desc(RecordCol::Id),
    };

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let resp = RecordsListResponse {
        records: rows.into_iter().map(AttendanceRecordResponse::from).collect(),
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance records retrieved")),
    )
}

/// GET /api/attendance/records/export
///
/// **Auth**: admin. Export the (filtered) attendance records as a CSV
/// attachment, newest first. Every data field is double-quoted, with embedded
/// quotes doubled.
///
/// Columns: `Student Name, Roll Number, Section, Event, Date, Time, Location`
pub async fn export_records_csv(
    State(state): State<AppState>,
    Query(q): Query<RecordsListQuery>,
) -> (StatusCode, (HeaderMap, String)) {
    let db = state.db();

    let records = match filtered_records(&q)
        .order_by_desc(RecordCol::CreatedAt)
        .order_by_desc(RecordCol::Id)
        .all(db)
        .await
    {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "failed to export attendance records");
            let mut headers = HeaderMap::new();
            headers.insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                (headers, "error".to_string()),
            );
        }
    };

    fn quote(s: &str) -> String {
        format!("\"{}\"", s.replace('"', "\"\""))
    }

    let mut csv = String::from("Student Name,Roll Number,Section,Event,Date,Time,Location\n");
    for r in records {
        let row = [
            quote(&r.student_name),
            quote(&r.roll_number),
            quote(&r.section.to_string()),
            quote(&r.event.to_string()),
            quote(&r.created_at.format("%Y-%m-%d").to_string()),
            quote(&r.created_at.format("%H:%M:%S").to_string()),
            quote(r.location_name.as_deref().unwrap_or("Campus")),
        ]
        .join(",");
        csv.push_str(&row);
        csv.push('\n');
    }

    let filename = format!("attendance-{}.csv", Utc::now().format("%Y-%m-%d"));

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        axum::http::header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    (StatusCode::OK, (headers, csv))
}

/// GET /api/attendance/qr-link
///
/// **Auth**: admin. Builds the student-facing URL a QR code should encode
/// for a given section and event. The submission client pre-fills both
/// fields from the query parameters and locks them for the session.
pub async fn get_qr_link(
    Query(q): Query<QrLinkQuery>,
) -> (StatusCode, Json<ApiResponse<Option<QrLinkResponse>>>) {
    let (Some(section), Some(event)) = (q.section, q.event) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Both section and event are required to generate a QR link",
            )),
        );
    };

    let mut url = match Url::parse(&config::frontend_url()) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, "FRONTEND_URL is not a valid URL");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Frontend URL is misconfigured")),
            );
        }
    };
    url.query_pairs_mut()
        .append_pair("section", &section.to_string())
        .append_pair("event", &event.to_string());

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            Some(QrLinkResponse {
                url: url.to_string(),
            }),
            "QR link generated",
        )),
    )
}
