//! Typed clients for the marketplace resources. They all go through
//! [`crate::api::ApiClient`], so they carry the bearer token and a rejected
//! token on any of them ends the session.

pub mod admin;
pub mod bookings;
pub mod experiences;
pub mod reviews;
