use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!(
                "Invalid status {other}. Must be one of: pending, confirmed, completed, cancelled"
            )),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A booking row as listed by `/bookings/my-bookings` and `/admin/bookings`.
/// Older deployments use the `booking_date`/`number_of_people` names.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Booking {
    pub id: u64,
    #[serde(default)]
    pub experience_id: Option<u64>,
    #[serde(default, alias = "title")]
    pub experience_title: Option<String>,
    #[serde(default)]
    pub guide_name: Option<String>,
    /// Set on the guide's listing.
    #[serde(default)]
    pub traveler_name: Option<String>,
    #[serde(alias = "booking_date")]
    pub tour_date: String,
    #[serde(alias = "number_of_people")]
    pub guest_count: u32,
    #[serde(default, alias = "total_price")]
    pub total_amount: f64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub location: Option<String>,
}

/// Reply to a status change: the booking id and its new status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct StatusChange {
    pub id: u64,
    pub status: BookingStatus,
}

#[derive(Deserialize)]
pub(crate) struct StatusChangeResponse {
    pub booking: StatusChange,
}

#[derive(Serialize)]
pub(crate) struct StatusChangeRequest {
    pub status: BookingStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBooking {
    pub experience_id: u64,
    pub tour_date: String,
    pub guest_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

impl NewBooking {
    #[must_use]
    pub fn new(experience_id: u64, tour_date: impl Into<String>, guest_count: u32) -> Self {
        Self {
            experience_id,
            tour_date: tour_date.into(),
            guest_count,
            payment_method_id: None,
        }
    }

    /// # Errors
    /// Returns a user-facing message when the date or guest count is unusable.
    pub fn validate(&self) -> Result<(), String> {
        if !is_iso_date(&self.tour_date) {
            return Err("Tour date must be in YYYY-MM-DD format".to_string());
        }
        if self.guest_count == 0 {
            return Err("At least one guest is required".to_string());
        }
        Ok(())
    }
}

fn is_iso_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    matches!(parts.as_slice(), [year, month, day]
        if year.len() == 4
            && month.len() == 2
            && day.len() == 2
            && parts.iter().all(|part| part.chars().all(|c| c.is_ascii_digit()))
            && (1..=12).contains(&month.parse::<u8>().unwrap_or(0))
            && (1..=31).contains(&day.parse::<u8>().unwrap_or(0)))
}
