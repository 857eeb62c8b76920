use super::types::{
    Booking, BookingStatus, NewBooking, StatusChange, StatusChangeRequest, StatusChangeResponse,
};
use crate::api::{ApiClient, ApiError};
use tracing::instrument;

#[derive(Clone)]
pub struct BookingsClient {
    api: ApiClient,
}

impl BookingsClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Books an experience for the signed-in traveler.
    #[instrument(skip_all, fields(experience_id = booking.experience_id))]
    pub async fn create(&self, booking: &NewBooking) -> Result<serde_json::Value, ApiError> {
        booking.validate().map_err(ApiError::Invalid)?;
        self.api.post_json("/bookings", booking).await
    }

    pub async fn mine(&self) -> Result<Vec<Booking>, ApiError> {
        self.api.get_json("/bookings/my-bookings").await
    }

    /// Every booking on the platform; the backend only allows admins.
    pub async fn all(&self) -> Result<Vec<Booking>, ApiError> {
        self.api.get_json("/admin/bookings").await
    }

    /// Bookings on a guide's experiences, soonest first. Guides may only list
    /// their own; admins may list any guide's.
    pub async fn for_guide(&self, guide_id: u64) -> Result<Vec<Booking>, ApiError> {
        self.api.get_json(&format!("/bookings/guide/{guide_id}")).await
    }

    /// Moves a booking to a new status, as the experience's guide or an admin.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: u64,
        status: BookingStatus,
    ) -> Result<StatusChange, ApiError> {
        if status == BookingStatus::Unknown {
            return Err(ApiError::Invalid(
                "Status must be pending, confirmed, completed or cancelled".to_string(),
            ));
        }
        let response: StatusChangeResponse = self
            .api
            .put_json(&format!("/bookings/{id}/status"), &StatusChangeRequest { status })
            .await?;
        Ok(response.booking)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.api.delete(&format!("/bookings/{id}")).await
    }
}
