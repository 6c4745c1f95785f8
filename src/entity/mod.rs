pub mod agents;
pub mod booking_passengers;
pub mod bookings;
pub mod commissions;
pub mod departures;
pub mod jamaah;
pub mod packages;
pub mod payments;

pub use agents::Entity as Agents;
pub use booking_passengers::Entity as BookingPassengers;
pub use bookings::Entity as Bookings;
pub use commissions::Entity as Commissions;
pub use departures::Entity as Departures;
pub use jamaah::Entity as Jamaah;
pub use packages::Entity as Packages;
pub use payments::Entity as Payments;
