use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_people: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_id: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewExperience {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_people: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl NewExperience {
    /// Checks the fields the backend rejects with a 400.
    ///
    /// # Errors
    /// Returns a user-facing message for the first missing or invalid field.
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("Title", &self.title),
            ("Description", &self.description),
            ("Location", &self.location),
            ("Category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{label} is required"));
            }
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err("Price must be greater than zero".to_string());
        }
        if self.max_people == Some(0) {
            return Err("Group size must be at least one".to_string());
        }
        Ok(())
    }
}

/// Search filters; unset fields are left out of the query string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExperienceFilters {
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub date: Option<String>,
    pub availability: Option<String>,
}

impl ExperienceFilters {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let text = [
            ("category", &self.category),
            ("location", &self.location),
        ];
        for (name, value) in text {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.push((name, value.to_string()));
            }
        }
        if let Some(min) = self.min_price {
            query.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            query.push(("max_price", max.to_string()));
        }
        for (name, value) in [("date", &self.date), ("availability", &self.availability)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((name, value.to_string()));
            }
        }
        query
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Availability {
    #[serde(default, alias = "available_dates")]
    pub dates: Vec<String>,
}
