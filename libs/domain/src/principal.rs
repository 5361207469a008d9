//! Acting identity supplied by the authentication layer

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Platform role of a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SalonAdmin,
    Customer,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SalonAdmin => "salon_admin",
            Role::Customer => "customer",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Platform-wide roles see and touch every tenant
    pub fn is_platform(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "salon_admin" => Ok(Role::SalonAdmin),
            "customer" => Ok(Role::Customer),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Authenticated caller, derived per request and never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub salon_id: Option<Uuid>,
}

impl Principal {
    pub fn new(id: Uuid, role: Role, salon_id: Option<Uuid>) -> Self {
        Self { id, role, salon_id }
    }

    pub fn customer(id: Uuid) -> Self {
        Self::new(id, Role::Customer, None)
    }

    pub fn salon_admin(id: Uuid, salon_id: Uuid) -> Self {
        Self::new(id, Role::SalonAdmin, Some(salon_id))
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, Role::Admin, None)
    }

    pub fn super_admin(id: Uuid) -> Self {
        Self::new(id, Role::SuperAdmin, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_wire_names() {
        for role in [Role::Admin, Role::SalonAdmin, Role::Customer, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_snake_case() {
        let json = serde_json::to_string(&Role::SalonAdmin).unwrap();
        assert_eq!(json, "\"salon_admin\"");
    }
}
