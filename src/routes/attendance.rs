use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::attendance::{BulkAttendanceRequest, BulkAttendanceSaved},
    error::AppResult,
    middleware::auth::AuthUser,
    services::attendance_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/attendance/bulk", post(bulk_save))
}

#[utoipa::path(
    post,
    path = "/api/attendance/bulk",
    request_body = BulkAttendanceRequest,
    responses(
        (status = 200, description = "Attendance sheet saved", body = BulkAttendanceSaved),
        (status = 400, description = "Empty entries"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn bulk_save(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkAttendanceRequest>,
) -> AppResult<Json<BulkAttendanceSaved>> {
    let resp = attendance_service::bulk_save(&state, &user, payload).await?;
    Ok(Json(resp))
}
