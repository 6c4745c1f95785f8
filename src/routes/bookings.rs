use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::bookings::{BookingCreated, CreateBookingRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/bookings/create", post(create_booking))
}

#[utoipa::path(
    post,
    path = "/api/bookings/create",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = BookingCreated),
        (status = 400, description = "Missing departure, contact or passengers"),
        (status = 404, description = "Departure not found"),
        (status = 500, description = "Booking transaction rolled back"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingCreated>> {
    let resp = booking_service::create_booking(&state, &user, payload).await?;
    Ok(Json(resp))
}
