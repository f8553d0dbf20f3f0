//! Attendance and results handlers.
//!
//! These routes sit behind composed requirements: a staff-class role plus
//! the matching capability tag. Admin passes implicitly.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::web::dto::{
    ApiResponse, AttendanceResponse, PublishResultRequest, RecordAttendanceRequest,
    ResultResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

const ATTENDANCE_STATUSES: &[&str] = &["present", "absent", "late"];

/// POST /api/records/attendance - Record attendance for a student.
///
/// One record per student per day; re-recording the same day overwrites
/// the earlier status.
#[utoipa::path(
    post,
    path = "/records/attendance",
    tag = "records",
    request_body = RecordAttendanceRequest,
    responses(
        (status = 200, description = "Attendance recorded"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller lacks TAKE_ATTENDANCE"),
        (status = 404, description = "No such student"),
        (status = 422, description = "Invalid status or date"),
    )
)]
pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    CurrentUser(recorder): CurrentUser,
    ValidatedJson(req): ValidatedJson<RecordAttendanceRequest>,
) -> Result<Json<ApiResponse<AttendanceResponse>>, ApiError> {
    if !ATTENDANCE_STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::unprocessable(format!(
            "Unknown attendance status: {}",
            req.status
        )));
    }
    if chrono::NaiveDate::parse_from_str(&req.date, "%Y-%m-%d").is_err() {
        return Err(ApiError::unprocessable("Date must be YYYY-MM-DD"));
    }

    let users = UserRepository::new(state.db.pool());
    if users
        .get_by_student_id(&req.student_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("No such student"));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO attendance_records (student_id, date, status, recorded_by)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(student_id, date)
         DO UPDATE SET status = excluded.status, recorded_by = excluded.recorded_by
         RETURNING id",
    )
    .bind(&req.student_id)
    .bind(&req.date)
    .bind(&req.status)
    .bind(recorder.id)
    .fetch_one(state.db.pool())
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(
        recorder_id = recorder.id,
        student_id = %req.student_id,
        date = %req.date,
        status = %req.status,
        "Attendance recorded"
    );

    Ok(Json(ApiResponse::new(AttendanceResponse {
        id,
        student_id: req.student_id,
        date: req.date,
        status: req.status,
    })))
}

/// POST /api/records/results - Publish an exam result for a student.
#[utoipa::path(
    post,
    path = "/records/results",
    tag = "records",
    request_body = PublishResultRequest,
    responses(
        (status = 200, description = "Result published"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller lacks MANAGE_RESULTS"),
        (status = 404, description = "No such student"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn publish_result(
    State(state): State<Arc<AppState>>,
    CurrentUser(publisher): CurrentUser,
    ValidatedJson(req): ValidatedJson<PublishResultRequest>,
) -> Result<Json<ApiResponse<ResultResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    if users
        .get_by_student_id(&req.student_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("No such student"));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO results (student_id, subject, term, score, published_by)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(&req.student_id)
    .bind(&req.subject)
    .bind(&req.term)
    .bind(req.score)
    .bind(publisher.id)
    .fetch_one(state.db.pool())
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(
        publisher_id = publisher.id,
        student_id = %req.student_id,
        subject = %req.subject,
        term = %req.term,
        "Result published"
    );

    Ok(Json(ApiResponse::new(ResultResponse {
        id,
        student_id: req.student_id,
        subject: req.subject,
        term: req.term,
        score: req.score,
    })))
}
