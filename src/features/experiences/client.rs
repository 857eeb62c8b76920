//! Client wrappers for the experiences endpoints. Listing and detail are
//! public on the backend but still carry the token when one is stored.

use super::types::{Availability, Experience, ExperienceFilters, NewExperience};
use crate::api::{ApiClient, ApiError};
use tracing::instrument;

#[derive(Clone)]
pub struct ExperiencesClient {
    api: ApiClient,
}

impl ExperiencesClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Experience>, ApiError> {
        self.api.get_json("/experiences").await
    }

    pub async fn get(&self, id: u64) -> Result<Experience, ApiError> {
        self.api.get_json(&format!("/experiences/{id}")).await
    }

    /// Fetches bookable dates, optionally bounded by ISO dates.
    pub async fn availability(
        &self,
        id: u64,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Availability, ApiError> {
        let mut query = Vec::new();
        if let Some(start) = start_date {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.to_string()));
        }
        self.api
            .get_json_with_query(&format!("/experiences/{id}/availability"), &query)
            .await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, filters: &ExperienceFilters) -> Result<Vec<Experience>, ApiError> {
        self.api
            .get_json_with_query("/experiences/search", &filters.to_query())
            .await
    }

    /// Creates a listing for the signed-in guide.
    #[instrument(skip_all, fields(title = %experience.title))]
    pub async fn create(&self, experience: &NewExperience) -> Result<serde_json::Value, ApiError> {
        experience.validate().map_err(ApiError::Invalid)?;
        self.api.post_json("/experiences", experience).await
    }

    /// Listings owned by the signed-in guide.
    pub async fn mine(&self) -> Result<Vec<Experience>, ApiError> {
        self.api.get_json("/experiences/my-experiences").await
    }
}
