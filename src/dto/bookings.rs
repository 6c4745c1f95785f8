use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PassengerInput {
    pub full_name: Option<String>,
    pub nik: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    /// Pre-resolved pilgrim id from the dashboard's autocomplete, if any.
    pub existing_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub departure_id: Option<i64>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub agent_id: Option<i64>,
    #[serde(default)]
    pub passengers: Vec<PassengerInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreated {
    pub success: bool,
    pub booking_id: i64,
    pub booking_code: String,
    pub message: String,
}
