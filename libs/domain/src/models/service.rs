//! Service catalog entries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable offering of one salon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub name: String,
    pub description: String,
    /// Length of one booking, in minutes
    pub duration_minutes: i32,
    pub price: f64,
    pub category: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// End of a booking of this service starting at `start`
    pub fn ends_at(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// New service creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "duration")]
    pub duration_minutes: i32,
    pub price: f64,
    pub category: String,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Service update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "duration")]
    pub duration_minutes: Option<i32>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}
