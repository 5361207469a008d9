//! Authorization guard
//!
//! One home for the role policy. Every read or write in the scheduler, the
//! catalog and the ledger goes through [`authorize`] (or one of its
//! narrower siblings) before any state is touched.

use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{DomainError, DomainResult},
    principal::{Principal, Role},
};

/// Tenant and customer that own a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOwner {
    pub salon_id: Uuid,
    pub customer_id: Option<Uuid>,
}

impl ResourceOwner {
    pub fn salon(salon_id: Uuid) -> Self {
        Self {
            salon_id,
            customer_id: None,
        }
    }

    pub fn customer(salon_id: Uuid, customer_id: Uuid) -> Self {
        Self {
            salon_id,
            customer_id: Some(customer_id),
        }
    }
}

/// Fail with `Unauthorized` when no principal accompanies the call
pub fn authenticate(principal: Option<&Principal>) -> DomainResult<&Principal> {
    principal.ok_or(DomainError::Unauthorized)
}

/// Decide whether `principal` may read or write a resource owned by `owner`
pub fn authorize(principal: Option<&Principal>, owner: ResourceOwner) -> DomainResult<&Principal> {
    let principal = authenticate(principal)?;

    let allowed = match principal.role {
        Role::Admin | Role::SuperAdmin => true,
        Role::SalonAdmin => principal.salon_id == Some(owner.salon_id),
        Role::Customer => owner.customer_id == Some(principal.id),
    };

    if allowed {
        Ok(principal)
    } else {
        warn!(
            principal = %principal.id,
            role = %principal.role,
            salon = %owner.salon_id,
            "access denied"
        );
        Err(DomainError::Forbidden(format!(
            "{} may not access resources of salon {}",
            principal.role, owner.salon_id
        )))
    }
}

/// Operations reserved to the salon's own administrator
pub fn authorize_salon_admin(principal: Option<&Principal>, salon_id: Uuid) -> DomainResult<&Principal> {
    let principal = authenticate(principal)?;
    if principal.role != Role::SalonAdmin {
        warn!(principal = %principal.id, role = %principal.role, "salon admin required");
        return Err(DomainError::Forbidden(
            "only a salon admin may perform this operation".to_string(),
        ));
    }
    authorize(Some(principal), ResourceOwner::salon(salon_id))
}

/// Operations reserved to `admin` and `super_admin`
pub fn authorize_platform(principal: Option<&Principal>) -> DomainResult<&Principal> {
    let principal = authenticate(principal)?;
    if principal.role.is_platform() {
        Ok(principal)
    } else {
        Err(DomainError::Forbidden(
            "only a platform admin may perform this operation".to_string(),
        ))
    }
}

/// Default visibility of a principal when listing records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scope {
    pub salon_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
}

impl Scope {
    pub fn for_principal(principal: &Principal) -> DomainResult<Self> {
        match principal.role {
            Role::Admin | Role::SuperAdmin => Ok(Scope::default()),
            Role::SalonAdmin => {
                let salon_id = principal.salon_id.ok_or_else(|| {
                    DomainError::Forbidden("salon admin has no salon".to_string())
                })?;
                Ok(Scope {
                    salon_id: Some(salon_id),
                    customer_id: None,
                })
            }
            Role::Customer => Ok(Scope {
                salon_id: None,
                customer_id: Some(principal.id),
            }),
        }
    }

    /// Intersect with a caller-requested salon; `None` when nothing can match
    pub fn narrow_salon(self, requested: Option<Uuid>) -> Option<Self> {
        match (self.salon_id, requested) {
            (Some(own), Some(asked)) if own != asked => None,
            (None, Some(asked)) => Some(Scope {
                salon_id: Some(asked),
                ..self
            }),
            _ => Some(self),
        }
    }
}
