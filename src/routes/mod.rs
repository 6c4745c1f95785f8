use axum::Router;

use crate::state::AppState;

pub mod attendance;
pub mod auth;
pub mod bookings;
pub mod doc;
pub mod documents;
pub mod health;
pub mod params;
pub mod payments;
pub mod resources;
pub mod rooming;

// Build the API router without binding state; it will be provided at the top level.
// Workflow routers are merged rather than nested so their static segments win
// over the registry's /{resource} captures.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(bookings::router())
        .merge(payments::router())
        .merge(documents::router())
        .merge(rooming::router())
        .merge(attendance::router())
        .merge(resources::router())
}
