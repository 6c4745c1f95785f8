use crate::{
    audit::log_audit,
    dto::attendance::{BulkAttendanceRequest, BulkAttendanceSaved},
    error::{AppError, AppResult},
    middleware::auth::{authorize, AuthUser},
    state::AppState,
};

const ATTENDANCE_ROLES: &[&str] = &["admin", "hr"];

/// Saves one day's attendance sheet in a single transaction, upserting on
/// (employee_id, work_date) so re-submitting the sheet corrects rather than
/// duplicates.
pub async fn bulk_save(
    state: &AppState,
    user: &AuthUser,
    payload: BulkAttendanceRequest,
) -> AppResult<BulkAttendanceSaved> {
    authorize(user, ATTENDANCE_ROLES)?;

    if payload.entries.is_empty() {
        return Err(AppError::Validation("entries must not be empty".into()));
    }

    let mut tx = state.pool.begin().await?;

    let mut saved: u64 = 0;
    for entry in &payload.entries {
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, work_date, status, note)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (employee_id, work_date)
            DO UPDATE SET status = EXCLUDED.status, note = EXCLUDED.note
            "#,
        )
        .bind(entry.employee_id)
        .bind(payload.work_date)
        .bind(entry.status.as_deref().unwrap_or("present"))
        .bind(entry.note.as_deref())
        .execute(&mut *tx)
        .await?;
        saved += 1;
    }

    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "attendance_bulk_save",
        Some("attendance"),
        Some(serde_json::json!({ "work_date": payload.work_date, "saved": saved })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(BulkAttendanceSaved {
        success: true,
        saved,
    })
}
