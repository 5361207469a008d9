//! Appointment scheduler
//!
//! Computes appointment windows from the booked service and drives the
//! appointment lifecycle. `end_time` is always derived here from the service
//! resolved inside the same operation; it is never taken from the caller.
//!
//! Overlapping bookings for the same salon and slot are accepted.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{DomainError, DomainResult},
    guard::{self, ResourceOwner, Scope},
    models::{Appointment, AppointmentStatus, NewAppointment, Service, UpdateAppointment},
    principal::{Principal, Role},
    store::{AppointmentFilter, AppointmentRepo, ServiceRepo},
};

/// Caller filters for listing appointments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    pub salon_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Calendar day (UTC) the appointment starts on
    pub date: Option<NaiveDate>,
}

/// Appointment scheduling operations
#[derive(Clone)]
pub struct Scheduler {
    appointments: Arc<dyn AppointmentRepo>,
    services: Arc<dyn ServiceRepo>,
}

fn owner_of(appointment: &Appointment) -> ResourceOwner {
    ResourceOwner::customer(appointment.salon_id, appointment.customer_id)
}

impl Scheduler {
    pub fn new(appointments: Arc<dyn AppointmentRepo>, services: Arc<dyn ServiceRepo>) -> Self {
        Self {
            appointments,
            services,
        }
    }

    /// Book a service. Salon admins book straight into `confirmed`.
    pub async fn create_appointment(
        &self,
        principal: Option<&Principal>,
        fields: NewAppointment,
    ) -> DomainResult<Appointment> {
        let principal = guard::authorize(
            principal,
            ResourceOwner::customer(fields.salon_id, fields.customer_id),
        )?;
        let service = self.resolve_service(fields.service_id, fields.salon_id).await?;

        let status = if principal.role == Role::SalonAdmin {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        };

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: fields.customer_id,
            salon_id: fields.salon_id,
            service_id: service.id,
            start_time: fields.start_time,
            end_time: service.ends_at(fields.start_time),
            status,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        };

        let appointment = self.appointments.create(appointment).await?;
        info!(
            appointment = %appointment.id,
            salon = %appointment.salon_id,
            status = %appointment.status,
            "appointment created"
        );
        Ok(appointment)
    }

    pub async fn get_appointment(&self, principal: Option<&Principal>, id: Uuid) -> DomainResult<Appointment> {
        guard::authenticate(principal)?;
        let appointment = self.load(id).await?;
        guard::authorize(principal, owner_of(&appointment))?;
        Ok(appointment)
    }

    /// Apply a patch. Moving the slot or switching the service recomputes
    /// `end_time` from the service resolved now, not from a cached duration.
    pub async fn update_appointment(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        patch: UpdateAppointment,
    ) -> DomainResult<Appointment> {
        guard::authenticate(principal)?;
        let mut appointment = self.load(id).await?;
        guard::authorize(principal, owner_of(&appointment))?;

        if patch.reschedules() {
            let service_id = patch.service_id.unwrap_or(appointment.service_id);
            let service = self.resolve_service(service_id, appointment.salon_id).await?;
            let start_time = patch.start_time.unwrap_or(appointment.start_time);

            appointment.service_id = service.id;
            appointment.start_time = start_time;
            appointment.end_time = service.ends_at(start_time);
        }
        if patch.notes.is_some() {
            appointment.notes = patch.notes;
        }
        appointment.updated_at = Utc::now();

        let appointment = self.appointments.update(appointment).await?;
        info!(appointment = %appointment.id, "appointment updated");
        Ok(appointment)
    }

    /// Move an appointment through its lifecycle
    pub async fn change_status(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        next: AppointmentStatus,
    ) -> DomainResult<Appointment> {
        guard::authenticate(principal)?;
        let mut appointment = self.load(id).await?;
        guard::authorize(principal, owner_of(&appointment))?;

        let current = appointment.status;
        if !current.can_transition_to(next) {
            return Err(DomainError::invalid_transition(current, next));
        }
        appointment.status = next;
        appointment.updated_at = Utc::now();

        let appointment = self.appointments.update(appointment).await?;
        info!(appointment = %appointment.id, from = %current, to = %next, "appointment status changed");
        Ok(appointment)
    }

    pub async fn delete_appointment(&self, principal: Option<&Principal>, id: Uuid) -> DomainResult<()> {
        guard::authenticate(principal)?;
        let appointment = self.load(id).await?;
        guard::authorize(principal, owner_of(&appointment))?;

        self.appointments.delete(id).await?;
        info!(appointment = %id, "appointment deleted");
        Ok(())
    }

    /// Appointments visible to the principal, narrowed by `query`, earliest first
    pub async fn list_appointments(
        &self,
        principal: Option<&Principal>,
        query: &AppointmentQuery,
    ) -> DomainResult<Vec<Appointment>> {
        let principal = guard::authenticate(principal)?;
        let Some(scope) = Scope::for_principal(principal)?.narrow_salon(query.salon_id) else {
            return Ok(Vec::new());
        };

        let filter = AppointmentFilter {
            salon_id: scope.salon_id,
            customer_id: scope.customer_id,
            status: query.status,
            starts_from: query.date.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
            starts_before: query
                .date
                .and_then(|d| d.succ_opt())
                .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        };

        let mut appointments = self.appointments.find(&filter).await?;
        appointments.sort_by_key(|a| a.start_time);
        Ok(appointments)
    }

    async fn load(&self, id: Uuid) -> DomainResult<Appointment> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", id))
    }

    async fn resolve_service(&self, service_id: Uuid, salon_id: Uuid) -> DomainResult<Service> {
        let service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Service", service_id))?;
        if service.salon_id != salon_id {
            return Err(DomainError::Validation(format!(
                "Service {} is not offered by salon {}",
                service_id, salon_id
            )));
        }
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::InMemoryStore, models::NewService, ServiceCatalog};
    use chrono::{DateTime, Duration};

    struct Fixture {
        scheduler: Scheduler,
        catalog: ServiceCatalog,
        salon: Uuid,
        owner: Principal,
        customer: Principal,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let salon = Uuid::new_v4();
        Fixture {
            scheduler: Scheduler::new(store.clone(), store.clone()),
            catalog: ServiceCatalog::new(store),
            salon,
            owner: Principal::salon_admin(Uuid::new_v4(), salon),
            customer: Principal::customer(Uuid::new_v4()),
        }
    }

    impl Fixture {
        async fn service(&self, name: &str, minutes: i32) -> Service {
            let fields = NewService {
                name: name.to_string(),
                description: String::new(),
                duration_minutes: minutes,
                price: 40.0,
                category: "hair".to_string(),
                image: None,
                is_active: None,
            };
            self.catalog
                .create_service(Some(&self.owner), self.salon, fields)
                .await
                .unwrap()
        }

        fn booking(&self, service: &Service, start: DateTime<Utc>) -> NewAppointment {
            NewAppointment {
                customer_id: self.customer.id,
                salon_id: self.salon,
                service_id: service.id,
                start_time: start,
                notes: None,
            }
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn end_time_follows_service_duration() {
        let fx = fixture();
        let start = at("2024-01-10T09:00:00Z");
        for minutes in [1, 15, 30, 95, 24 * 60] {
            let service = fx.service("Any", minutes).await;
            let booked = fx
                .scheduler
                .create_appointment(Some(&fx.customer), fx.booking(&service, start))
                .await
                .unwrap();
            assert_eq!(booked.end_time, start + Duration::minutes(minutes as i64));
        }
    }

    #[tokio::test]
    async fn initial_status_depends_on_who_books() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let start = at("2024-01-10T09:00:00Z");

        let by_customer = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&service, start))
            .await
            .unwrap();
        assert_eq!(by_customer.status, AppointmentStatus::Pending);

        let by_owner = fx
            .scheduler
            .create_appointment(Some(&fx.owner), fx.booking(&service, start))
            .await
            .unwrap();
        assert_eq!(by_owner.status, AppointmentStatus::Confirmed);

        let admin = Principal::admin(Uuid::new_v4());
        let by_admin = fx
            .scheduler
            .create_appointment(Some(&admin), fx.booking(&service, start))
            .await
            .unwrap();
        assert_eq!(by_admin.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn double_booking_is_accepted() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let start = at("2024-01-10T09:00:00Z");
        for _ in 0..2 {
            fx.scheduler
                .create_appointment(Some(&fx.customer), fx.booking(&service, start))
                .await
                .unwrap();
        }
        let listed = fx
            .scheduler
            .list_appointments(Some(&fx.owner), &AppointmentQuery::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn booking_rejections() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let start = at("2024-01-10T09:00:00Z");

        let mut missing = fx.booking(&service, start);
        missing.service_id = Uuid::new_v4();
        assert!(matches!(
            fx.scheduler.create_appointment(Some(&fx.customer), missing).await,
            Err(DomainError::NotFound { entity: "Service", .. })
        ));

        let someone_else = Principal::customer(Uuid::new_v4());
        assert!(matches!(
            fx.scheduler
                .create_appointment(Some(&someone_else), fx.booking(&service, start))
                .await,
            Err(DomainError::Forbidden(_))
        ));

        let other_salon_admin = Principal::salon_admin(Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            fx.scheduler
                .create_appointment(Some(&other_salon_admin), fx.booking(&service, start))
                .await,
            Err(DomainError::Forbidden(_))
        ));

        assert_eq!(
            fx.scheduler
                .create_appointment(None, fx.booking(&service, start))
                .await,
            Err(DomainError::Unauthorized)
        );

        let mut wrong_salon = fx.booking(&service, start);
        wrong_salon.salon_id = Uuid::new_v4();
        assert!(matches!(
            fx.scheduler.create_appointment(Some(&fx.customer), wrong_salon).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn rescheduling_recomputes_end_time() {
        let fx = fixture();
        let short = fx.service("Trim", 15).await;
        let long = fx.service("Colour", 90).await;
        let start = at("2024-01-10T09:00:00Z");
        let booked = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&short, start))
            .await
            .unwrap();

        // new start, same service
        let moved = fx
            .scheduler
            .update_appointment(
                Some(&fx.customer),
                booked.id,
                UpdateAppointment {
                    start_time: Some(at("2024-01-10T11:00:00Z")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.end_time, at("2024-01-10T11:15:00Z"));

        // new service, start kept
        let switched = fx
            .scheduler
            .update_appointment(
                Some(&fx.owner),
                booked.id,
                UpdateAppointment {
                    service_id: Some(long.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(switched.service_id, long.id);
        assert_eq!(switched.start_time, at("2024-01-10T11:00:00Z"));
        assert_eq!(switched.end_time, at("2024-01-10T12:30:00Z"));
    }

    #[tokio::test]
    async fn reschedule_uses_current_service_duration() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let start = at("2024-01-10T09:00:00Z");
        let booked = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&service, start))
            .await
            .unwrap();

        fx.catalog
            .update_service(
                Some(&fx.owner),
                service.id,
                crate::models::UpdateService {
                    duration_minutes: Some(60),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // the stored snapshot is untouched by the catalog edit
        let stored = fx.scheduler.get_appointment(Some(&fx.customer), booked.id).await.unwrap();
        assert_eq!(stored.end_time, at("2024-01-10T09:30:00Z"));

        let moved = fx
            .scheduler
            .update_appointment(
                Some(&fx.customer),
                booked.id,
                UpdateAppointment {
                    start_time: Some(start),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.end_time, at("2024-01-10T10:00:00Z"));
    }

    #[tokio::test]
    async fn notes_only_patch_keeps_window() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let booked = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&service, at("2024-01-10T09:00:00Z")))
            .await
            .unwrap();
        let patched = fx
            .scheduler
            .update_appointment(
                Some(&fx.customer),
                booked.id,
                UpdateAppointment {
                    notes: Some("Bring photos".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.notes.as_deref(), Some("Bring photos"));
        assert_eq!(patched.end_time, booked.end_time);
    }

    #[tokio::test]
    async fn status_changes_follow_the_table() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let booked = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&service, at("2024-01-10T09:00:00Z")))
            .await
            .unwrap();

        assert!(matches!(
            fx.scheduler
                .change_status(Some(&fx.owner), booked.id, AppointmentStatus::Pending)
                .await,
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            fx.scheduler
                .change_status(Some(&fx.owner), booked.id, AppointmentStatus::Completed)
                .await,
            Err(DomainError::InvalidTransition { .. })
        ));

        let confirmed = fx
            .scheduler
            .change_status(Some(&fx.owner), booked.id, AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        assert_eq!(confirmed.end_time, booked.end_time);

        let done = fx
            .scheduler
            .change_status(Some(&fx.owner), booked.id, AppointmentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);

        assert!(matches!(
            fx.scheduler
                .change_status(Some(&fx.owner), booked.id, AppointmentStatus::Cancelled)
                .await,
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn foreign_salon_admin_is_forbidden_by_id() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let booked = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&service, at("2024-01-10T09:00:00Z")))
            .await
            .unwrap();
        let intruder = Principal::salon_admin(Uuid::new_v4(), Uuid::new_v4());

        assert!(matches!(
            fx.scheduler.get_appointment(Some(&intruder), booked.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            fx.scheduler
                .change_status(Some(&intruder), booked.id, AppointmentStatus::Cancelled)
                .await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            fx.scheduler.delete_appointment(Some(&intruder), booked.id).await,
            Err(DomainError::Forbidden(_))
        ));
        let other_customer = Principal::customer(Uuid::new_v4());
        for principal in [&intruder, &other_customer] {
            let moved = UpdateAppointment {
                start_time: Some(at("2024-01-11T15:00:00Z")),
                notes: Some("moved".to_string()),
                ..Default::default()
            };
            assert!(matches!(
                fx.scheduler
                    .update_appointment(Some(principal), booked.id, moved)
                    .await,
                Err(DomainError::Forbidden(_))
            ));
        }
        // nothing was applied
        let stored = fx.scheduler.get_appointment(Some(&fx.owner), booked.id).await.unwrap();
        assert_eq!(stored.start_time, at("2024-01-10T09:00:00Z"));
        assert_eq!(stored.end_time, at("2024-01-10T09:30:00Z"));
        assert_eq!(stored, booked);
    }

    #[tokio::test]
    async fn delete_then_lookup_is_not_found() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;
        let booked = fx
            .scheduler
            .create_appointment(Some(&fx.customer), fx.booking(&service, at("2024-01-10T09:00:00Z")))
            .await
            .unwrap();
        fx.scheduler.delete_appointment(Some(&fx.customer), booked.id).await.unwrap();
        assert!(matches!(
            fx.scheduler.get_appointment(Some(&fx.customer), booked.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn listing_is_scoped_then_filtered_and_sorted() {
        let fx = fixture();
        let service = fx.service("Haircut", 30).await;

        for start in ["2024-01-11T10:00:00Z", "2024-01-10T09:00:00Z", "2024-01-10T14:00:00Z"] {
            fx.scheduler
                .create_appointment(Some(&fx.customer), fx.booking(&service, at(start)))
                .await
                .unwrap();
        }
        let stranger = Principal::customer(Uuid::new_v4());
        let mut theirs = fx.booking(&service, at("2024-01-10T12:00:00Z"));
        theirs.customer_id = stranger.id;
        fx.scheduler.create_appointment(Some(&stranger), theirs).await.unwrap();

        let mine = fx
            .scheduler
            .list_appointments(Some(&fx.customer), &AppointmentQuery::default())
            .await
            .unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.windows(2).all(|w| w[0].start_time <= w[1].start_time));

        let salon_day = fx
            .scheduler
            .list_appointments(
                Some(&fx.owner),
                &AppointmentQuery {
                    date: Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let starts: Vec<_> = salon_day.iter().map(|a| a.start_time).collect();
        assert_eq!(
            starts,
            vec![
                at("2024-01-10T09:00:00Z"),
                at("2024-01-10T12:00:00Z"),
                at("2024-01-10T14:00:00Z")
            ]
        );

        // a salon admin cannot widen to another salon
        let widened = fx
            .scheduler
            .list_appointments(
                Some(&fx.owner),
                &AppointmentQuery {
                    salon_id: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(widened.is_empty());

        let admin = Principal::super_admin(Uuid::new_v4());
        let pending = fx
            .scheduler
            .list_appointments(
                Some(&admin),
                &AppointmentQuery {
                    salon_id: Some(fx.salon),
                    status: Some(AppointmentStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(pending.len(), 4);

        assert_eq!(
            fx.scheduler
                .list_appointments(None, &AppointmentQuery::default())
                .await,
            Err(DomainError::Unauthorized)
        );
    }
}
