use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::Room;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub passenger_id: i64,
    /// `null` unassigns the passenger.
    pub room_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub departure_id: i64,
    pub hotel_id: Option<i64>,
    pub room_number: String,
    pub capacity: Option<i64>,
    pub room_gender: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct RoomingPassenger {
    pub id: i64,
    pub booking_id: i64,
    pub jamaah_id: i64,
    pub full_name: String,
    pub gender: String,
    pub room_type: String,
    pub assigned_room_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomWithOccupants {
    pub room: Room,
    pub occupants: Vec<RoomingPassenger>,
}

/// Rooming board for one departure: rooms with their occupants plus the
/// passengers still waiting for a bed.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomingView {
    pub rooms: Vec<RoomWithOccupants>,
    pub unassigned: Vec<RoomingPassenger>,
}
