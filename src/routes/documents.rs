use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::documents::{BulkUpdateRequest, BulkUpdated},
    error::AppResult,
    middleware::auth::AuthUser,
    services::document_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/documents/bulk-update", post(bulk_update))
}

#[utoipa::path(
    post,
    path = "/api/documents/bulk-update",
    request_body = BulkUpdateRequest,
    responses(
        (status = 200, description = "Manifest statuses updated", body = BulkUpdated),
        (status = 400, description = "Field not allowlisted or empty ids"),
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
pub async fn bulk_update(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkUpdateRequest>,
) -> AppResult<Json<BulkUpdated>> {
    let resp = document_service::bulk_update_status(&state, &user, payload).await?;
    Ok(Json(resp))
}
