use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Review {
    pub id: u64,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A traveler's review of a completed booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub booking_id: u64,
    pub experience_id: u64,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    /// # Errors
    /// Returns a user-facing message when the rating or comment is unusable.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.rating) {
            return Err("Rating must be between 1 and 5".to_string());
        }
        if self.comment.trim().is_empty() {
            return Err("Comment is required".to_string());
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub(crate) struct CreatedReview {
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8, comment: &str) -> NewReview {
        NewReview {
            booking_id: 5,
            experience_id: 2,
            rating,
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_validation() {
        assert!(review(5, "Asante sana, unforgettable").validate().is_ok());
        assert_eq!(
            review(0, "meh").validate().unwrap_err(),
            "Rating must be between 1 and 5"
        );
        assert_eq!(review(6, "wow").validate().unwrap_err(), "Rating must be between 1 and 5");
        assert_eq!(review(4, "  ").validate().unwrap_err(), "Comment is required");
    }
}
