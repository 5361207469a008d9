//! Service catalog
//!
//! Read-mostly reference data. Reads are public; writes are reserved to the
//! administrator of the salon that owns the service. Durations are accepted
//! as any positive number of minutes.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{DomainError, DomainResult},
    guard,
    models::{NewService, Service, UpdateService},
    principal::Principal,
    store::ServiceRepo,
};

/// Service catalog operations
#[derive(Clone)]
pub struct ServiceCatalog {
    services: Arc<dyn ServiceRepo>,
}

impl ServiceCatalog {
    pub fn new(services: Arc<dyn ServiceRepo>) -> Self {
        Self { services }
    }

    /// Get a service by ID
    pub async fn get_service(&self, id: Uuid) -> DomainResult<Service> {
        self.services
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Service", id))
    }

    /// List the services of a salon; the salon is mandatory
    pub async fn list_services(&self, salon_id: Option<Uuid>) -> DomainResult<Vec<Service>> {
        let salon_id =
            salon_id.ok_or_else(|| DomainError::Validation("Salon ID is required".to_string()))?;
        Ok(self.services.find_by_salon(salon_id).await?)
    }

    /// Add a service to a salon
    pub async fn create_service(
        &self,
        principal: Option<&Principal>,
        salon_id: Uuid,
        fields: NewService,
    ) -> DomainResult<Service> {
        guard::authorize_salon_admin(principal, salon_id)?;
        validate_fields(&fields.name, fields.duration_minutes, fields.price)?;

        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            salon_id,
            name: fields.name,
            description: fields.description,
            duration_minutes: fields.duration_minutes,
            price: fields.price,
            category: fields.category,
            image: fields.image,
            is_active: fields.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let service = self.services.create(service).await?;
        info!(service = %service.id, salon = %salon_id, "service created");
        Ok(service)
    }

    /// Edit a service. Existing appointments keep the end time they were booked with.
    pub async fn update_service(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        patch: UpdateService,
    ) -> DomainResult<Service> {
        guard::authenticate(principal)?;
        let mut service = self.get_service(id).await?;
        guard::authorize_salon_admin(principal, service.salon_id)?;

        if let Some(name) = patch.name {
            service.name = name;
        }
        if let Some(description) = patch.description {
            service.description = description;
        }
        if let Some(duration) = patch.duration_minutes {
            service.duration_minutes = duration;
        }
        if let Some(price) = patch.price {
            service.price = price;
        }
        if let Some(category) = patch.category {
            service.category = category;
        }
        if patch.image.is_some() {
            service.image = patch.image;
        }
        if let Some(active) = patch.is_active {
            service.is_active = active;
        }
        validate_fields(&service.name, service.duration_minutes, service.price)?;
        service.updated_at = Utc::now();

        let service = self.services.update(service).await?;
        info!(service = %service.id, "service updated");
        Ok(service)
    }

    /// Remove a service
    pub async fn delete_service(&self, principal: Option<&Principal>, id: Uuid) -> DomainResult<Service> {
        guard::authenticate(principal)?;
        let service = self.get_service(id).await?;
        guard::authorize_salon_admin(principal, service.salon_id)?;

        self.services.delete(id).await?;
        info!(service = %id, "service deleted");
        Ok(service)
    }
}

fn validate_fields(name: &str, duration_minutes: i32, price: f64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("Service name is required".to_string()));
    }
    if duration_minutes <= 0 {
        return Err(DomainError::Validation(
            "Service duration must be a positive number of minutes".to_string(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::Validation(
            "Service price must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn haircut() -> NewService {
        NewService {
            name: "Haircut".to_string(),
            description: "Wash and cut".to_string(),
            duration_minutes: 30,
            price: 25.0,
            category: "hair".to_string(),
            image: None,
            is_active: None,
        }
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn owner_creates_and_lists_services() {
        let catalog = catalog();
        let salon = Uuid::new_v4();
        let owner = Principal::salon_admin(Uuid::new_v4(), salon);

        let created = catalog
            .create_service(Some(&owner), salon, haircut())
            .await
            .unwrap();
        assert!(created.is_active);
        assert_eq!(created.salon_id, salon);

        let listed = catalog.list_services(Some(salon)).await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(catalog.get_service(created.id).await.unwrap(), created);
        assert!(catalog.list_services(Some(Uuid::new_v4())).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn services_are_listed_oldest_first() {
        let store = Arc::new(InMemoryStore::new());
        let catalog = ServiceCatalog::new(store.clone());
        let salon = Uuid::new_v4();
        let start = Utc::now();

        // Names sort the other way round from creation time
        let mut created = Vec::new();
        for (offset, name) in [(0, "Zig-zag braids"), (1, "Manicure"), (2, "Afro trim")] {
            let at = start + chrono::Duration::minutes(offset);
            let service = Service {
                id: Uuid::new_v4(),
                salon_id: salon,
                name: name.to_string(),
                description: String::new(),
                duration_minutes: 30,
                price: 10.0,
                category: "hair".to_string(),
                image: None,
                is_active: true,
                created_at: at,
                updated_at: at,
            };
            created.push(store.create(service).await.unwrap());
        }

        assert_eq!(catalog.list_services(Some(salon)).await.unwrap(), created);
    }

    #[tokio::test]
    async fn listing_without_salon_is_a_validation_error() {
        assert!(matches!(
            catalog().list_services(None).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn odd_durations_are_accepted() {
        let catalog = catalog();
        let salon = Uuid::new_v4();
        let owner = Principal::salon_admin(Uuid::new_v4(), salon);
        let mut fields = haircut();
        fields.duration_minutes = 7;
        let service = catalog.create_service(Some(&owner), salon, fields).await.unwrap();
        assert_eq!(service.duration_minutes, 7);
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let catalog = catalog();
        let salon = Uuid::new_v4();
        let owner = Principal::salon_admin(Uuid::new_v4(), salon);

        let mut zero = haircut();
        zero.duration_minutes = 0;
        assert!(matches!(
            catalog.create_service(Some(&owner), salon, zero).await,
            Err(DomainError::Validation(_))
        ));

        let mut negative = haircut();
        negative.price = -1.0;
        assert!(matches!(
            catalog.create_service(Some(&owner), salon, negative).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn foreign_salon_writes_are_forbidden() {
        let catalog = catalog();
        let salon = Uuid::new_v4();
        let owner = Principal::salon_admin(Uuid::new_v4(), salon);
        let intruder = Principal::salon_admin(Uuid::new_v4(), Uuid::new_v4());
        let customer = Principal::customer(Uuid::new_v4());

        assert!(matches!(
            catalog.create_service(Some(&intruder), salon, haircut()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            catalog.create_service(Some(&customer), salon, haircut()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(
            catalog.create_service(None, salon, haircut()).await,
            Err(DomainError::Unauthorized)
        );

        let service = catalog.create_service(Some(&owner), salon, haircut()).await.unwrap();
        let patch = UpdateService {
            price: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            catalog.update_service(Some(&intruder), service.id, patch).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            catalog.delete_service(Some(&intruder), service.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(catalog.get_service(service.id).await.unwrap().price, 25.0);
    }

    #[tokio::test]
    async fn owner_updates_and_deletes() {
        let catalog = catalog();
        let salon = Uuid::new_v4();
        let owner = Principal::salon_admin(Uuid::new_v4(), salon);
        let service = catalog.create_service(Some(&owner), salon, haircut()).await.unwrap();

        let patch = UpdateService {
            duration_minutes: Some(45),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = catalog.update_service(Some(&owner), service.id, patch).await.unwrap();
        assert_eq!(updated.duration_minutes, 45);
        assert!(!updated.is_active);
        assert_eq!(updated.name, "Haircut");

        catalog.delete_service(Some(&owner), service.id).await.unwrap();
        assert!(matches!(
            catalog.get_service(service.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
