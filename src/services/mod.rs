pub mod bookings;
pub mod catalog;
pub mod contacts;
pub mod rates;
pub mod reports;
pub mod submission;
pub mod users;
