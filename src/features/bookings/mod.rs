mod client;
mod types;

pub use client::BookingsClient;
pub use types::{Booking, BookingStatus, NewBooking, StatusChange};
