use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde_json::Value as JsonValue;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::{authorize, AuthUser},
    response::{Deleted, Paginated},
    schema::{self, ResourceDef},
    services::crud_service,
    state::AppState,
};

/// Explicit route table for every registered resource. The path segment is
/// resolved against the static registry; unknown resources are 404s.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{resource}", get(list_items).post(create_item))
        .route(
            "/{resource}/{id}",
            get(get_item).post(update_item).delete(delete_item),
        )
}

fn resolve(resource: &str) -> AppResult<&'static ResourceDef> {
    schema::find(resource).ok_or(AppError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/{resource}",
    params(
        ("resource" = String, Path, description = "Resource path segment"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Substring search over the resource's searchable fields"),
        ("orderby" = Option<String>, Query, description = "Sort column, validated against an allowlist"),
        ("order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "Paginated items", body = Paginated<JsonValue>),
        (status = 400, description = "Invalid sort column"),
        (status = 404, description = "Unknown resource"),
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Paginated<JsonValue>>> {
    let def = resolve(&resource)?;
    authorize(&user, def.permissions.get_items)?;
    let page = crud_service::list(&state.pool, def, &query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource path segment"),
        ("id" = i64, Path, description = "Row id"),
    ),
    responses(
        (status = 200, description = "Single row", body = JsonValue),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn get_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource, id)): Path<(String, i64)>,
) -> AppResult<Json<JsonValue>> {
    let def = resolve(&resource)?;
    authorize(&user, def.permissions.get_item)?;
    let row = crud_service::get(&state.pool, def, id).await?;
    Ok(Json(row))
}

#[utoipa::path(
    post,
    path = "/api/{resource}",
    params(("resource" = String, Path, description = "Resource path segment")),
    responses(
        (status = 200, description = "Created row", body = JsonValue),
        (status = 400, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource): Path<String>,
    Json(body): Json<JsonValue>,
) -> AppResult<Json<JsonValue>> {
    let def = resolve(&resource)?;
    authorize(&user, def.permissions.create_item)?;
    let row = crud_service::create(&state.pool, def, body).await?;
    Ok(Json(row))
}

#[utoipa::path(
    post,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource path segment"),
        ("id" = i64, Path, description = "Row id"),
    ),
    responses(
        (status = 200, description = "Updated row", body = JsonValue),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource, id)): Path<(String, i64)>,
    Json(body): Json<JsonValue>,
) -> AppResult<Json<JsonValue>> {
    let def = resolve(&resource)?;
    authorize(&user, def.permissions.update_item)?;
    let row = crud_service::update(&state.pool, def, id, body).await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource path segment"),
        ("id" = i64, Path, description = "Row id"),
    ),
    responses(
        (status = 200, description = "Deleted", body = Deleted),
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource, id)): Path<(String, i64)>,
) -> AppResult<Json<Deleted>> {
    let def = resolve(&resource)?;
    authorize(&user, def.permissions.delete_item)?;
    let deleted = crud_service::delete(&state.pool, def, id).await?;
    Ok(Json(deleted))
}
