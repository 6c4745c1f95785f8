use std::collections::HashMap;

use crate::{
    audit::log_audit,
    dto::rooming::{
        AssignRequest, AssignResponse, CreateRoomRequest, RoomWithOccupants, RoomingPassenger,
        RoomingView,
    },
    error::{AppError, AppResult},
    middleware::auth::{authorize, AuthUser},
    models::Room,
    response::Deleted,
    state::AppState,
};

const ROOMING_ROLES: &[&str] = &["admin", "operator"];

/// Moves a passenger into a room, or out of any room when `room_id` is null.
/// Capacity is advisory only; the dashboard warns, the server does not block.
pub async fn assign_passenger(
    state: &AppState,
    user: &AuthUser,
    payload: AssignRequest,
) -> AppResult<AssignResponse> {
    authorize(user, ROOMING_ROLES)?;

    if let Some(room_id) = payload.room_id {
        let room: Option<(i64,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&state.pool)
            .await?;
        if room.is_none() {
            return Err(AppError::NotFound);
        }
    }

    let result = sqlx::query("UPDATE booking_passengers SET assigned_room_id = $2 WHERE id = $1")
        .bind(payload.passenger_id)
        .bind(payload.room_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "rooming_assign",
        Some("booking_passengers"),
        Some(serde_json::json!({
            "passenger_id": payload.passenger_id,
            "room_id": payload.room_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(AssignResponse { success: true })
}

pub async fn create_room(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRoomRequest,
) -> AppResult<Room> {
    authorize(user, ROOMING_ROLES)?;

    let room: Room = sqlx::query_as(
        r#"
        INSERT INTO rooms (departure_id, hotel_id, room_number, capacity, room_gender)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(payload.departure_id)
    .bind(payload.hotel_id)
    .bind(&payload.room_number)
    .bind(payload.capacity.unwrap_or(4))
    .bind(payload.room_gender.unwrap_or_else(|| "mixed".to_string()))
    .fetch_one(&state.pool)
    .await?;

    Ok(room)
}

/// Unassigns every occupant and removes the room in one transaction, so no
/// passenger is ever left pointing at a room id that no longer exists.
pub async fn delete_room(state: &AppState, user: &AuthUser, id: i64) -> AppResult<Deleted> {
    authorize(user, ROOMING_ROLES)?;

    let mut tx = state.pool.begin().await?;

    let room: Option<(i64,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if room.is_none() {
        return Err(AppError::NotFound);
    }

    sqlx::query("UPDATE booking_passengers SET assigned_room_id = NULL WHERE assigned_room_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "room_delete",
        Some("rooms"),
        Some(serde_json::json!({ "room_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Deleted::new(id))
}

/// The rooming board for one departure: every room with its occupants, plus
/// the passengers not yet placed.
pub async fn departure_rooms(
    state: &AppState,
    user: &AuthUser,
    departure_id: i64,
) -> AppResult<RoomingView> {
    authorize(user, &[])?;

    let rooms: Vec<Room> =
        sqlx::query_as("SELECT * FROM rooms WHERE departure_id = $1 ORDER BY room_number")
            .bind(departure_id)
            .fetch_all(&state.pool)
            .await?;

    let passengers: Vec<RoomingPassenger> = sqlx::query_as(
        r#"
        SELECT bp.id, bp.booking_id, bp.jamaah_id, j.full_name, j.gender,
               bp.room_type, bp.assigned_room_id
        FROM booking_passengers bp
        JOIN bookings b ON b.id = bp.booking_id
        JOIN jamaah j ON j.id = bp.jamaah_id
        WHERE b.departure_id = $1
        ORDER BY j.full_name
        "#,
    )
    .bind(departure_id)
    .fetch_all(&state.pool)
    .await?;

    let mut by_room: HashMap<i64, Vec<RoomingPassenger>> = HashMap::new();
    let mut unassigned = Vec::new();
    for passenger in passengers {
        match passenger.assigned_room_id {
            Some(room_id) => by_room.entry(room_id).or_default().push(passenger),
            None => unassigned.push(passenger),
        }
    }

    let rooms = rooms
        .into_iter()
        .map(|room| {
            let occupants = by_room.remove(&room.id).unwrap_or_default();
            RoomWithOccupants { room, occupants }
        })
        .collect();

    Ok(RoomingView { rooms, unassigned })
}
