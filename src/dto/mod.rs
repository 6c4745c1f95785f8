pub mod attendance;
pub mod auth;
pub mod bookings;
pub mod documents;
pub mod payments;
pub mod rooming;
