//! Appointments and their lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status_enum;

status_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl AppointmentStatus {
    /// `cancelled` and `completed` accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    /// Self transitions are not allowed.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

/// A booked service slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub salon_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Snapshot of `start_time + service duration` taken when the slot was last moved
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New appointment creation payload
///
/// There is no `end_time` here; it is always derived from the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[serde(alias = "customer")]
    pub customer_id: Uuid,
    #[serde(alias = "salon")]
    pub salon_id: Uuid,
    #[serde(alias = "service")]
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Appointment update payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointment {
    #[serde(alias = "service")]
    pub service_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl UpdateAppointment {
    /// Whether applying this patch moves the slot
    pub fn reschedules(&self) -> bool {
        self.service_id.is_some() || self.start_time.is_some()
    }
}
