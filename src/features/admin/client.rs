use super::types::{ApproveResponse, GuideRecord, GuidesResponse, Statistics, UsersResponse};
use crate::{
    api::{ApiClient, ApiError},
    auth::types::UserSummary,
};
use tracing::instrument;

/// Admin-only endpoints. Non-admin tokens get a 403 from the backend, which
/// surfaces as an [`ApiError::Http`] without ending the session.
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn users(&self) -> Result<Vec<UserSummary>, ApiError> {
        let response: UsersResponse = self.api.get_json("/admin/users").await?;
        Ok(response.into())
    }

    pub async fn statistics(&self) -> Result<Statistics, ApiError> {
        self.api.get_json("/admin/statistics").await
    }

    pub async fn guides(&self) -> Result<Vec<GuideRecord>, ApiError> {
        let response: GuidesResponse = self.api.get_json("/admin/guides").await?;
        Ok(response.guides)
    }

    #[instrument(skip(self))]
    pub async fn approve_guide(&self, id: u64) -> Result<GuideRecord, ApiError> {
        let response: ApproveResponse = self
            .api
            .put_json(&format!("/admin/guides/{id}/approve"), &serde_json::json!({}))
            .await?;
        Ok(response.guide)
    }
}
