//! Scheduling and commission core for the salon dashboard
//!
//! This crate holds the rules that matter: who may touch which appointment,
//! service or order, how appointment windows are computed from a service's
//! duration, how an appointment moves through its lifecycle, and how every
//! order accrues exactly one commission. Persistence is reached through the
//! repository traits in [`store`]; nothing in here talks to a database.

pub mod catalog;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod memory;
pub mod models;
pub mod principal;
pub mod scheduler;
pub mod store;

pub use catalog::ServiceCatalog;
pub use error::{DomainError, DomainResult};
pub use ledger::{DEFAULT_COMMISSION_RATE, Ledger};
pub use memory::InMemoryStore;
pub use principal::{Principal, Role};
pub use scheduler::Scheduler;
pub use store::{StoreError, StoreResult};
