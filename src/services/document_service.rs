use crate::{
    audit::log_audit,
    dto::documents::{BulkUpdateRequest, BulkUpdated},
    error::{AppError, AppResult},
    middleware::auth::{authorize, AuthUser},
    state::AppState,
};

const DOCUMENT_ROLES: &[&str] = &["admin", "operator"];

/// Columns the bulk manifest update may touch. Anything else is rejected
/// before any SQL runs.
const BULK_FIELDS: &[&str] = &["visa_status", "passport_status", "vaccine_status"];

pub async fn bulk_update_status(
    state: &AppState,
    user: &AuthUser,
    payload: BulkUpdateRequest,
) -> AppResult<BulkUpdated> {
    authorize(user, DOCUMENT_ROLES)?;

    let field = allowed_field(&payload.field)?;
    if payload.ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".into()));
    }

    // Single statement, so no explicit transaction is needed.
    let sql = format!("UPDATE booking_passengers SET {field} = $1 WHERE id = ANY($2)");
    let result = sqlx::query(&sql)
        .bind(&payload.value)
        .bind(&payload.ids)
        .execute(&state.pool)
        .await?;

    let updated_count = result.rows_affected();

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "documents_bulk_update",
        Some("booking_passengers"),
        Some(serde_json::json!({
            "field": field,
            "value": payload.value,
            "updated_count": updated_count,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(BulkUpdated {
        success: true,
        updated_count,
    })
}

fn allowed_field(field: &str) -> AppResult<&'static str> {
    BULK_FIELDS
        .iter()
        .find(|f| **f == field)
        .copied()
        .ok_or_else(|| AppError::InvalidField(format!("'{field}' is not bulk-updatable")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_columns_pass_the_allowlist() {
        assert_eq!(allowed_field("visa_status").unwrap(), "visa_status");
        assert_eq!(allowed_field("passport_status").unwrap(), "passport_status");
        assert_eq!(allowed_field("vaccine_status").unwrap(), "vaccine_status");
    }

    #[test]
    fn other_columns_are_rejected() {
        assert!(matches!(
            allowed_field("price_pax"),
            Err(AppError::InvalidField(_))
        ));
        assert!(matches!(
            allowed_field("visa_status; DROP TABLE bookings"),
            Err(AppError::InvalidField(_))
        ));
    }
}
