mod client;
mod types;

pub use client::ExperiencesClient;
pub use types::{Availability, Experience, ExperienceFilters, NewExperience};
