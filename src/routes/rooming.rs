use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};

use crate::{
    dto::rooming::{AssignRequest, AssignResponse, CreateRoomRequest, RoomingView},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Room,
    response::Deleted,
    services::rooming_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooming/assign", post(assign))
        .route("/rooming/rooms", post(create_room))
        .route("/rooming/rooms/{id}", delete(delete_room))
        .route("/rooming/departures/{id}", get(departure_rooms))
}

#[utoipa::path(
    post,
    path = "/api/rooming/assign",
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Passenger moved", body = AssignResponse),
        (status = 404, description = "Passenger or room not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rooming"
)]
pub async fn assign(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AssignRequest>,
) -> AppResult<Json<AssignResponse>> {
    let resp = rooming_service::assign_passenger(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/rooming/rooms",
    request_body = CreateRoomRequest,
    responses((status = 200, description = "Room created", body = Room)),
    security(("bearer_auth" = [])),
    tag = "Rooming"
)]
pub async fn create_room(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRoomRequest>,
) -> AppResult<Json<Room>> {
    let resp = rooming_service::create_room(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/rooming/rooms/{id}",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room removed, occupants unassigned", body = Deleted),
        (status = 404, description = "Room not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rooming"
)]
pub async fn delete_room(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    let resp = rooming_service::delete_room(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rooming/departures/{id}",
    params(("id" = i64, Path, description = "Departure id")),
    responses((status = 200, description = "Rooming board", body = RoomingView)),
    security(("bearer_auth" = [])),
    tag = "Rooming"
)]
pub async fn departure_rooms(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<RoomingView>> {
    let resp = rooming_service::departure_rooms(&state, &user, id).await?;
    Ok(Json(resp))
}
