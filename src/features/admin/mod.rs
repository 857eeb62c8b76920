mod client;
mod types;

pub use client::AdminClient;
pub use types::{GuideRecord, Statistics};
