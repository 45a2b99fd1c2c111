pub mod auth;
pub mod bookings;
pub mod categories;
pub mod payments;
pub mod providers;
pub mod reviews;
pub mod users;
