use super::types::{CreatedReview, NewReview, Review};
use crate::api::{ApiClient, ApiError};
use tracing::instrument;

/// Reviews are readable by anyone. Only the traveler of a completed booking
/// may post one; the backend answers 403 otherwise.
#[derive(Clone)]
pub struct ReviewsClient {
    api: ApiClient,
}

impl ReviewsClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn for_experience(&self, experience_id: u64) -> Result<Vec<Review>, ApiError> {
        self.api.get_json(&format!("/reviews/{experience_id}")).await
    }

    /// Posts a review and returns its id.
    #[instrument(skip_all, fields(booking_id = review.booking_id))]
    pub async fn create(&self, review: &NewReview) -> Result<u64, ApiError> {
        review.validate().map_err(ApiError::Invalid)?;
        let created: CreatedReview = self.api.post_json("/reviews", review).await?;
        Ok(created.id)
    }
}
