mod client;
mod types;

pub use client::ReviewsClient;
pub use types::{NewReview, Review};
