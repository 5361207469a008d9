//! Entities owned by the core

pub mod appointment;
pub mod commission;
pub mod order;
pub mod service;

// Re-export for convenience
pub use appointment::{Appointment, AppointmentStatus, NewAppointment, UpdateAppointment};
pub use commission::{Commission, CommissionStatus};
pub use order::{NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, ShippingAddress, UpdateOrder};
pub use service::{NewService, Service, UpdateService};

/// Status enums travel as lowercase strings on the wire and in the store.
macro_rules! status_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub(crate) use status_enum;
