//! API models for request payloads the domain types don't cover

use domain::models::{AppointmentStatus, NewService};
use serde::Deserialize;
use uuid::Uuid;

/// Request body for `POST /services`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[serde(alias = "salon")]
    pub salon_id: Uuid,
    #[serde(flatten)]
    pub service: NewService,
}

/// Query string for `GET /services`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    pub salon_id: Option<Uuid>,
}

/// Request body for `PUT /appointments/:id/status`
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: AppointmentStatus,
}
